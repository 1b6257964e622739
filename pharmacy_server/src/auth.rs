//! JWT bearer-token authentication.
//!
//! Inbound requests carry an `Authorization: Bearer <jwt>` header. The token is an HS256 JWT signed with the shared
//! secret from [`AuthConfig`], whose claims identify the caller by email. Registration/login and the original token
//! issuance live in the storefront's auth service; this module only validates tokens and exposes the claims to
//! handlers via the actix [`FromRequest`] extractor, plus a [`TokenIssuer`] used by tooling and tests.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The caller's email. The engine resolves this to an internal user id at each boundary entry.
    pub sub: String,
    pub name: String,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued-at (unix seconds)
    pub iat: i64,
}

impl JwtClaims {
    pub fn email(&self) -> &str {
        &self.sub
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| ServerError::ConfigurationError("Auth configuration is not registered".to_string()))?;
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))?;
    let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    let data = jsonwebtoken::decode::<JwtClaims>(token, &key, &Validation::default()).map_err(|e| {
        debug!("🔐️ Token validation failed: {e}");
        AuthError::ValidationError(e.to_string())
    })?;
    Ok(data.claims)
}

pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, lifetime: config.token_lifetime }
    }

    /// Issue a new access token for the given identity. The caller is responsible for having authenticated the
    /// identity first.
    pub fn issue_token(&self, email: &str, name: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: email.to_string(),
            name: name.to_string(),
            exp: (now + self.lifetime).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.key)
            .map_err(|e| AuthError::CouldNotSerializeToken(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use ppg_common::Secret;

    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig { jwt_secret: Secret::new("unit-test-secret".to_string()), token_lifetime: chrono::Duration::hours(1) }
    }

    #[test]
    fn issued_tokens_validate_and_round_trip_claims() {
        let config = test_config();
        let issuer = TokenIssuer::new(&config);
        let token = issuer.issue_token("alice@example.com", "Alice").unwrap();

        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let data = jsonwebtoken::decode::<JwtClaims>(&token, &key, &Validation::default()).unwrap();
        assert_eq!(data.claims.email(), "alice@example.com");
        assert_eq!(data.claims.name, "Alice");
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue_token("alice@example.com", "Alice").unwrap();

        let key = DecodingKey::from_secret(b"a-different-secret");
        let result = jsonwebtoken::decode::<JwtClaims>(&token, &key, &Validation::default());
        assert!(result.is_err());
    }
}
