//! Error taxonomy shared by every pipeline stage.
//!
//! No stage retries. Each failure short-circuits the pipeline and reaches the
//! boundary as one of the variants below; [`PipelineError::kind`] gives a stable
//! machine-readable name and `Display` gives the user-facing message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller's request was rejected before any stage ran (empty topic,
    /// unknown model identifier, unknown status).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed signing identity, unbuildable HTTP client or bad base URL.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A remote system answered with a non-success status, or the request never
    /// completed. `status` is `None` for transport failures.
    #[error("upstream error{}: {body}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, body: String },

    /// The generation backend returned text that is not a JSON object.
    #[error("generated content is not valid JSON: {0}")]
    Parse(String),

    /// A remote success response lacked the fields we need.
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_) => "invalid_request",
            PipelineError::Configuration(_) => "configuration",
            PipelineError::Upstream { .. } => "upstream",
            PipelineError::Parse(_) => "parse",
            PipelineError::ResponseShape(_) => "response_shape",
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        PipelineError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_when_known() {
        let err = PipelineError::Upstream {
            status: Some(422),
            body: "{\"errors\":[]}".into(),
        };
        assert_eq!(err.to_string(), "upstream error (HTTP 422): {\"errors\":[]}");
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn upstream_display_omits_status_for_transport_failures() {
        let err = PipelineError::Upstream {
            status: None,
            body: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "upstream error: connection refused");
    }
}
