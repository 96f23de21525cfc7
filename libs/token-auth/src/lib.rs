//! Symmetric bearer-token issuance and verification.
//!
//! Claims carry identity (`userId`, `login`, `name`, `surname`) plus the
//! standard `iat`/`exp` pair. Tokens are signed HS256; verification rejects
//! any token whose header declares a different algorithm before even
//! attempting signature validation, closing the classic algorithm-confusion
//! downgrade (e.g. an attacker swapping HS256 for `none` or for an
//! asymmetric algorithm verified with the wrong key).

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("token verification failed")]
    Verify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    user_id: Uuid,
    login: String,
    name: String,
    surname: String,
    iat: i64,
    exp: i64,
}

/// The identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub login: String,
    pub name: String,
    pub surname: String,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: StdDuration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl: StdDuration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        login: &str,
        name: &str,
        surname: &str,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = Duration::from_std(self.ttl).unwrap_or_else(|_| Duration::zero());
        let claims = Claims {
            user_id,
            login: login.to_owned(),
            name: name.to_owned(),
            surname: surname.to_owned(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(TokenError::Sign)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Verify)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::Verify);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| TokenError::Verify)?;

        Ok(Identity {
            user_id: data.claims.user_id,
            login: data.claims.login,
            name: data.claims.name,
            surname: data.claims.surname,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", StdDuration::from_secs(3600))
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.issue(user_id, "Ivan", "Иван", "Грозный").unwrap();
        let identity = svc.verify(&token).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.login, "Ivan");
        assert_eq!(identity.name, "Иван");
        assert_eq!(identity.surname, "Грозный");
    }

    #[test]
    fn rejects_expired_token() {
        let svc = service();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            login: "Ivan".into(),
            name: "Иван".into(),
            surname: "Грозный".into(),
            iat: (Utc::now() - Duration::hours(2)).timestamp(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(svc.secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Verify)));
    }

    #[test]
    fn rejects_non_hs256_algorithm() {
        let svc = service();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            login: "Ivan".into(),
            name: "Иван".into(),
            surname: "Грозный".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        // Same secret, different declared algorithm: this must never be
        // accepted even though the signature itself is valid for HS384.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(svc.secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Verify)));
    }

    #[test]
    fn rejects_wrong_secret() {
        let svc = service();
        let token = svc.issue(Uuid::new_v4(), "Ivan", "Иван", "Грозный").unwrap();
        let other = TokenService::new("different-secret", StdDuration::from_secs(3600));
        assert!(matches!(other.verify(&token), Err(TokenError::Verify)));
    }
}
