//! Token claim decoding.
//!
//! Tokens are JWTs. Decoding is local and does not verify the signature;
//! the server verifies it on every authenticated request.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecodeError;

/// Decoded token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user id, as issued by the server).
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Expiry, seconds since the epoch.
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,

    /// Not-before, seconds since the epoch.
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,

    /// Private claims.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Decode the payload segment of a token.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        if segments.len() != 3 {
            return Err(DecodeError::Segments(segments.len()));
        }
        let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// The subject as a numeric user id.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.as_deref().and_then(|s| s.parse().ok())
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Subject>::deserialize(deserializer)?.map(|s| match s {
        Subject::Text(s) => s,
        Subject::Number(n) => n.to_string(),
    }))
}

/// NumericDate may carry a fraction; whole seconds are kept, rounding down.
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(i64),
        Fractional(f64),
    }

    Ok(Option::<Seconds>::deserialize(deserializer)?.map(|s| match s {
        Seconds::Whole(n) => n,
        Seconds::Fractional(f) => f.floor() as i64,
    }))
}

/// Build an unsigned token carrying `claims`.
///
/// The signature segment is a fixed placeholder; only useful against code
/// that decodes without verifying.
#[cfg(any(test, feature = "testing"))]
pub fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_registered_claims() {
        let token = unsigned_token(&json!({"sub": "0", "exp": 1_900_000_000, "nbf": 1_800_000_000}));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.subject_id(), Some(0));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert!(claims.expires_at().is_some());
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_fractional_numeric_dates() {
        let token = unsigned_token(&json!({
            "sub": "0",
            "exp": 1_900_000_000.5,
            "nbf": 1.8e9,
            "iat": 1_799_999_999.999
        }));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.subject_id(), Some(0));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(claims.nbf, Some(1_800_000_000));
        assert_eq!(claims.iat, Some(1_799_999_999));
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_non_numeric_date_is_rejected() {
        let token = unsigned_token(&json!({"sub": "0", "exp": "tomorrow"}));
        assert!(matches!(Claims::decode(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_numeric_subject_and_private_claims() {
        let token = unsigned_token(&json!({"sub": 42, "role": "author"}));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.extra.get("role"), Some(&json!("author")));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let token = unsigned_token(&json!({"sub": "7"}));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        while parts[1].len() % 4 != 0 {
            parts[1].push('=');
        }
        let claims = Claims::decode(&parts.join(".")).unwrap();
        assert_eq!(claims.subject_id(), Some(7));
    }

    #[test]
    fn test_wrong_segment_count() {
        assert!(matches!(
            Claims::decode("not-a-token"),
            Err(DecodeError::Segments(1))
        ));
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            Claims::decode("a.!!!.c"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_payload_not_json() {
        let payload = URL_SAFE_NO_PAD.encode("hello");
        let token = format!("a.{}.c", payload);
        assert!(matches!(Claims::decode(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims::decode(&unsigned_token(&json!({"sub": "martin"}))).unwrap();
        assert_eq!(claims.subject_id(), None);
    }
}
