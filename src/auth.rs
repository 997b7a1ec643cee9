//! Bearer token verification.
//!
//! Tokens are JWTs signed with a shared HMAC secret. The signing algorithm is
//! fixed at startup; a token signed with any other algorithm is rejected even
//! if the signature would otherwise check out.
//!
//! # Claims
//!
//! ```json
//! { "userId": "u-123", "userType": "vendor", "exp": 1705315800 }
//! ```
//!
//! `userId` and `exp` are required. `userType` is optional and passed through
//! without interpretation.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const EXPIRED_TOKEN: &str = "Token has expired";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Claim set carried by a credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "userType", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    /// Expiry as seconds since the Unix epoch
    pub exp: u64,
}

/// Caller identity established by a verified token.
///
/// Inserted into request extensions by the admission layer so handlers can
/// pull it out with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
}

/// Verifies bearer tokens against a shared secret.
///
/// Stateless and cheap to clone behind an `Arc`; no locking is needed.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token against the current wall clock.
    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as of `now` (seconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` when the token is malformed, carries a bad
    /// signature or algorithm, has expired, or lacks a `userId`.
    pub fn verify_at(&self, token: &str, now: u64) -> AppResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized(EXPIRED_TOKEN.to_string()),
                kind => {
                    tracing::debug!(reason = ?kind, "Token rejected");
                    AppError::Unauthorized(INVALID_TOKEN.to_string())
                }
            }
        })?;

        let claims = data.claims;

        if claims.exp <= now {
            return Err(AppError::Unauthorized(EXPIRED_TOKEN.to_string()));
        }

        let subject_id = claims
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

        Ok(AuthenticatedUser {
            subject_id,
            subject_type: claims.user_type,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.validation
            .algorithms
            .first()
            .copied()
            .unwrap_or(Algorithm::HS256)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const SECRET: &str = "test-secret";
    const NOW: u64 = 1_700_000_000;

    fn sign(claims: serde_json::Value, secret: &str, algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, Algorithm::HS256)
    }

    fn unauthorized_message(result: AppResult<AuthenticatedUser>) -> String {
        match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_token() {
        let token = sign(
            json!({"userId": "u-1", "userType": "vendor", "exp": NOW + 3600}),
            SECRET,
            Algorithm::HS256,
        );

        let user = verifier().verify_at(&token, NOW).unwrap();
        assert_eq!(user.subject_id, "u-1");
        assert_eq!(user.subject_type.as_deref(), Some("vendor"));
    }

    #[test]
    fn test_subject_type_is_optional() {
        let token = sign(json!({"userId": "u-2", "exp": NOW + 60}), SECRET, Algorithm::HS256);

        let user = verifier().verify_at(&token, NOW).unwrap();
        assert_eq!(user.subject_id, "u-2");
        assert!(user.subject_type.is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(json!({"userId": "u-1", "exp": NOW - 1}), SECRET, Algorithm::HS256);

        assert_eq!(
            unauthorized_message(verifier().verify_at(&token, NOW)),
            EXPIRED_TOKEN
        );
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let token = sign(json!({"userId": "u-1", "exp": NOW}), SECRET, Algorithm::HS256);

        assert_eq!(
            unauthorized_message(verifier().verify_at(&token, NOW)),
            EXPIRED_TOKEN
        );
    }

    #[test]
    fn test_expired_token_with_bad_signature_rejected() {
        let token = sign(json!({"userId": "u-1", "exp": NOW - 10}), "other", Algorithm::HS256);
        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_missing_subject_rejected() {
        let token = sign(json!({"userType": "buyer", "exp": NOW + 60}), SECRET, Algorithm::HS256);

        assert_eq!(
            unauthorized_message(verifier().verify_at(&token, NOW)),
            INVALID_TOKEN
        );
    }

    #[test]
    fn test_blank_subject_rejected() {
        let token = sign(json!({"userId": "  ", "exp": NOW + 60}), SECRET, Algorithm::HS256);
        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let token = sign(json!({"userId": "u-1"}), SECRET, Algorithm::HS256);
        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(json!({"userId": "u-1", "exp": NOW + 60}), "wrong", Algorithm::HS256);

        assert_eq!(
            unauthorized_message(verifier().verify_at(&token, NOW)),
            INVALID_TOKEN
        );
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let token = sign(json!({"userId": "u-1", "exp": NOW + 60}), SECRET, Algorithm::HS512);
        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        for token in ["", "not-a-jwt", "a.b.c", "....."] {
            assert_eq!(
                unauthorized_message(verifier().verify_at(token, NOW)),
                INVALID_TOKEN
            );
        }
    }

    #[test]
    fn test_verify_uses_wall_clock() {
        let token = sign(json!({"userId": "u-1", "exp": 1}), SECRET, Algorithm::HS256);
        assert!(verifier().verify(&token).is_err());

        let token = sign(
            json!({"userId": "u-1", "exp": unix_now() + 600}),
            SECRET,
            Algorithm::HS256,
        );
        assert!(verifier().verify(&token).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", verifier());
        assert!(debug.contains("HS256"));
        assert!(!debug.contains(SECRET));
    }
}
