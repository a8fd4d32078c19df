//! Signed client session tokens.
//!
//! A [SessionToken] binds a client to the id of the user account it logged in as. The token is
//! serialized to a string for the session cookie, signed with HMAC-SHA256 using the application
//! SECRET, so the server does not need to keep any session state itself. On every request, the
//! token is parsed and verified from the cookie value before the user identity is looked up in the
//! data store.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    user_id: Uuid,
    issued_at: u64,
}

impl SessionToken {
    /// Create a fresh session token for the given user account, issued now.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            issued_at: unix_timestamp_now(),
        }
    }

    /// The id of the user account this session is authenticated as.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Parse and verify a session token from its cookie string representation.
    ///
    /// The signature is verified against `secret` and the token's age is checked against
    /// `max_age`.
    pub fn from_string(data: &str, secret: &str, max_age: Duration) -> Result<Self, SessionError> {
        let (payload_b64, signature_b64) = data
            .split_once('.')
            .ok_or(SessionError::InvalidTokenFormat)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionError::InvalidTokenFormat)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| SessionError::InvalidTokenFormat)?;

        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        hmac::verify(&key, &payload, &signature)
            .map_err(|_| SessionError::SignatureVerificationFailed)?;

        let payload = String::from_utf8(payload).map_err(|_| SessionError::InvalidTokenFormat)?;
        let (user_id, issued_at) = payload
            .split_once(':')
            .ok_or(SessionError::InvalidTokenFormat)?;
        let token = Self {
            user_id: user_id
                .parse()
                .map_err(|_| SessionError::InvalidTokenFormat)?,
            issued_at: issued_at
                .parse()
                .map_err(|_| SessionError::InvalidTokenFormat)?,
        };

        if token.issued_at.saturating_add(max_age.as_secs()) < unix_timestamp_now() {
            return Err(SessionError::ExpiredToken);
        }
        Ok(token)
    }

    /// Serialize and sign the token for use as a session cookie value.
    pub fn as_string(&self, secret: &str) -> String {
        let payload = format!("{}:{}", self.user_id, self.issued_at);
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let signature = hmac::sign(&key, payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        )
    }
}

fn unix_timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    InvalidTokenFormat,
    SignatureVerificationFailed,
    ExpiredToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";
    const MAX_AGE: Duration = Duration::from_secs(86400);

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = SessionToken::new(user_id);
        let serialized = token.as_string(SECRET);
        let parsed = SessionToken::from_string(&serialized, SECRET, MAX_AGE).unwrap();
        assert_eq!(parsed.user_id(), user_id);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let token = SessionToken::new(Uuid::new_v4());
        let serialized = token.as_string(SECRET);
        let (_, signature) = serialized.split_once('.').unwrap();
        let other_payload =
            URL_SAFE_NO_PAD.encode(format!("{}:{}", Uuid::new_v4(), unix_timestamp_now()));
        let forged = format!("{}.{}", other_payload, signature);
        assert_eq!(
            SessionToken::from_string(&forged, SECRET, MAX_AGE),
            Err(SessionError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = SessionToken::new(Uuid::new_v4());
        let serialized = token.as_string(SECRET);
        assert_eq!(
            SessionToken::from_string(&serialized, "other-secret", MAX_AGE),
            Err(SessionError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = SessionToken {
            user_id: Uuid::new_v4(),
            issued_at: unix_timestamp_now() - 7200,
        };
        let serialized = token.as_string(SECRET);
        assert_eq!(
            SessionToken::from_string(&serialized, SECRET, Duration::from_secs(3600)),
            Err(SessionError::ExpiredToken)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            SessionToken::from_string("not-a-token", SECRET, MAX_AGE),
            Err(SessionError::InvalidTokenFormat)
        );
    }
}
