//! Prompt construction for the generation backend.
//!
//! Everything here is a pure function of its inputs. Unknown tone and language
//! values degrade to named defaults ([`DEFAULT_TONE`], [`DEFAULT_LANGUAGE`]) instead
//! of failing the pipeline.

use std::fmt;

/// Writing register requested for the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Professional,
    Casual,
    Technical,
    Educational,
    Persuasive,
}

pub const DEFAULT_TONE: Tone = Tone::Professional;

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Technical,
        Tone::Educational,
        Tone::Persuasive,
    ];

    /// Exact lookup by code, falling back to [`DEFAULT_TONE`] for anything else.
    pub fn from_code(code: &str) -> Tone {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == code)
            .unwrap_or(DEFAULT_TONE)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Technical => "technical",
            Tone::Educational => "educational",
            Tone::Persuasive => "persuasive",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "Write in a professional, authoritative tone suited to business readers."
            }
            Tone::Casual => "Write in a friendly, conversational tone, as if talking to a friend.",
            Tone::Technical => {
                "Write in a precise, technical tone with accurate terminology and concrete examples."
            }
            Tone::Educational => {
                "Write in a clear, educational tone that explains concepts step by step."
            }
            Tone::Persuasive => {
                "Write in a persuasive tone that builds a compelling case and motivates the reader to act."
            }
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        DEFAULT_TONE
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_LANGUAGE: &str = "en";

/// Supported language codes and the names used in the instruction text.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("hi", "Hindi"),
    ("ar", "Arabic"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
];

fn lookup_language(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Display name for `code`, or the default language's name when unsupported.
pub fn language_display_name(code: &str) -> &'static str {
    lookup_language(code)
        .or_else(|| lookup_language(DEFAULT_LANGUAGE))
        .unwrap_or("English")
}

/// Keys the backend is asked to return.
pub const RESPONSE_KEYS: [&str; 5] = [
    "title",
    "meta_description",
    "keywords",
    "content",
    "internal_links",
];

/// Describes the JSON object the backend must produce. This is a contract with
/// the generation client; the parser tolerates any subset of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    pub keys: &'static [&'static str],
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self {
            keys: &RESPONSE_KEYS,
        }
    }
}

impl ResponseSchema {
    pub fn describe(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("\"{k}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub schema: ResponseSchema,
}

pub fn build_prompt(topic: &str, tone: Tone, language: &str) -> Prompt {
    let schema = ResponseSchema::default();
    let language_name = language_display_name(language);
    let text = format!(
        r#"Write a comprehensive, SEO-optimized blog post about: {topic}

Tone: {tone_instruction}
Language: write the entire post in {language_name}.

Requirements:
- Create an engaging title
- Write a compelling introduction
- Include 3-5 main sections with subheadings
- Add actionable insights and examples
- Write a strong conclusion
- Use markdown formatting
- Make it approximately 1000-1500 words
- Where a related article would help the reader, insert a placeholder of the exact form [related: <topic>] and list those topics in "internal_links"

Format the response as a single JSON object with keys: {keys}
- "title": the post title
- "meta_description": a search-engine description of at most 155 characters
- "keywords": an array of 5-8 short keywords
- "content": the full post body in markdown
- "internal_links": an array of related topic names used in placeholders"#,
        tone_instruction = tone.instruction(),
        keys = schema.describe(),
    );
    Prompt { text, schema }
}
