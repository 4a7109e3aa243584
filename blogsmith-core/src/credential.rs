//! Short-lived admin credentials for the Ghost admin API.
//!
//! An admin key is configured as `<key id>:<hex secret>`. [`SigningIdentity::parse`]
//! validates it once at configuration time; [`SigningIdentity::sign`] then mints a
//! fresh HS256 JWT for every call to the target system. Tokens are never cached.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Lifetime of every minted token.
pub const TOKEN_LIFETIME_SECS: i64 = 300;

/// Audience claim identifying the admin API surface.
pub const ADMIN_AUDIENCE: &str = "/admin/";

/// Scheme name used in the `Authorization` header.
pub const AUTHORIZATION_SCHEME: &str = "Ghost";

#[derive(Clone)]
pub struct SigningIdentity {
    key_id: String,
    secret: Vec<u8>,
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct AdminClaims<'a> {
    iat: i64,
    exp: i64,
    aud: &'a str,
}

impl SigningIdentity {
    /// Parse `<key id>:<hex secret>`. The secret is hex-decoded to raw bytes here,
    /// so a malformed key fails fast instead of at signing time.
    pub fn parse(raw: &str) -> PipelineResult<Self> {
        let (key_id, secret_hex) = raw.trim().split_once(':').ok_or_else(|| {
            PipelineError::Configuration(
                "admin API key must have the form <key id>:<hex secret>".into(),
            )
        })?;
        if key_id.is_empty() {
            return Err(PipelineError::Configuration(
                "admin API key has an empty key id".into(),
            ));
        }
        if secret_hex.is_empty() {
            return Err(PipelineError::Configuration(
                "admin API key has an empty secret".into(),
            ));
        }
        let secret = hex::decode(secret_hex).map_err(|e| {
            PipelineError::Configuration(format!("admin API key secret is not valid hex: {e}"))
        })?;
        Ok(Self {
            key_id: key_id.to_string(),
            secret,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Mint a token valid from `now` (truncated to whole seconds) for
    /// [`TOKEN_LIFETIME_SECS`].
    pub fn sign(&self, now: DateTime<Utc>) -> PipelineResult<SignedCredential> {
        let issued_at = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).ok_or_else(|| {
            PipelineError::Configuration(format!("signing time {now} is out of range"))
        })?;
        let expires_at = issued_at + TimeDelta::seconds(TOKEN_LIFETIME_SECS);

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.key_id.clone());
        let claims = AdminClaims {
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            aud: ADMIN_AUDIENCE,
        };

        let token = encode(&header, &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| PipelineError::Configuration(format!("failed to sign admin token: {e}")))?;

        debug!(key_id = %self.key_id, iat = claims.iat, exp = claims.exp, "Signed admin credential");
        Ok(SignedCredential {
            token,
            issued_at,
            expires_at,
        })
    }
}

#[derive(Clone)]
pub struct SignedCredential {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for SignedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedCredential")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl SignedCredential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{AUTHORIZATION_SCHEME} {}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
    use serde::Deserialize;

    const KEY: &str = "6489f1a2b3c4d5e6f7a8b9c0:a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iat: i64,
        exp: i64,
        aud: String,
    }

    fn decode_claims(token: &str, secret: &[u8]) -> jsonwebtoken::errors::Result<DecodedClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[ADMIN_AUDIENCE]);
        decode::<DecodedClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let err = SigningIdentity::parse("abcdef").unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn parse_rejects_non_hex_secret() {
        let err = SigningIdentity::parse("kid:not-hex-at-all").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(msg) if msg.contains("hex")));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(SigningIdentity::parse(":abcd").is_err());
        assert!(SigningIdentity::parse("kid:").is_err());
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let identity = SigningIdentity::parse(KEY).unwrap();
        let printed = format!("{identity:?}");
        assert!(printed.contains("6489f1a2b3c4d5e6f7a8b9c0"));
        assert!(!printed.contains("a1b2c3d4e5f6"));
    }

    #[test]
    fn token_header_carries_key_id() {
        let identity = SigningIdentity::parse(KEY).unwrap();
        let credential = identity.sign(at(1_700_000_000)).unwrap();
        let header = decode_header(credential.token()).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.kid.as_deref(), Some("6489f1a2b3c4d5e6f7a8b9c0"));
    }

    #[test]
    fn token_is_signed_with_hex_decoded_secret() {
        let identity = SigningIdentity::parse(KEY).unwrap();
        let credential = identity.sign(at(1_700_000_000)).unwrap();
        let (_, secret_hex) = KEY.split_once(':').unwrap();

        let raw = hex::decode(secret_hex).unwrap();
        let claims = decode_claims(credential.token(), &raw).expect("raw bytes verify");
        assert_eq!(claims.aud, "/admin/");

        assert!(decode_claims(credential.token(), secret_hex.as_bytes()).is_err());
    }

    #[test]
    fn each_signature_reflects_its_call_time_and_lasts_five_minutes() {
        let identity = SigningIdentity::parse(KEY).unwrap();
        let first = identity.sign(at(1_700_000_000)).unwrap();
        let second = identity.sign(at(1_700_000_001)).unwrap();

        for credential in [&first, &second] {
            assert_eq!(
                (credential.expires_at() - credential.issued_at()).num_seconds(),
                300
            );
        }
        assert_eq!(first.issued_at(), at(1_700_000_000));
        assert_eq!(second.issued_at(), at(1_700_000_001));
        assert_ne!(first.token(), second.token());

        let (_, secret_hex) = KEY.split_once(':').unwrap();
        let claims = decode_claims(second.token(), &hex::decode(secret_hex).unwrap()).unwrap();
        assert_eq!(claims.iat, 1_700_000_001);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn credential_expires_after_lifetime() {
        let identity = SigningIdentity::parse(KEY).unwrap();
        let credential = identity.sign(at(1_700_000_000)).unwrap();
        assert!(!credential.is_expired_at(at(1_700_000_299)));
        assert!(credential.is_expired_at(at(1_700_000_300)));
        assert!(credential.authorization_header().starts_with("Ghost ey"));
    }
}
