use crate::error::JwtError;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims issued by the identity provider. Only `sub` is consumed: it is the
/// opaque user id polls are attributed to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// HS256 verifier built once from the shared secret at startup.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidTokenFormat,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(sub: &str, exp: i64, secret: &[u8]) -> String {
        let claims = Claims {
            sub: sub.into(),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn in_one_hour() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp()
    }

    #[test]
    fn valid_token_yields_subject() {
        let verifier = TokenVerifier::new(b"secret");
        let claims = verifier
            .verify(&sign("github|42", in_one_hour(), b"secret"))
            .unwrap();
        assert_eq!(claims.sub, "github|42");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = TokenVerifier::new(b"other");
        assert!(matches!(
            verifier.verify(&sign("github|42", in_one_hour(), b"secret")),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new(b"secret");
        assert!(matches!(
            verifier.verify(&sign("github|42", 1, b"secret")),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn garbage_is_a_format_error() {
        let verifier = TokenVerifier::new(b"secret");
        assert!(matches!(
            verifier.verify("not-a-jwt"),
            Err(JwtError::InvalidTokenFormat)
        ));
    }
}
