//! JWT utilities for issuing and validating bearer tokens.
//!
//! Tokens are signed with the shared secret from the configuration and carry
//! the username as subject plus issue and expiry timestamps. Nothing about a
//! token is stored server side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Username of the authenticated user
    pub sub: String,
    /// Token expiration timestamp (unix seconds)
    pub exp: i64,
    /// Token issued at timestamp (unix seconds)
    pub iat: i64,
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    expires_in: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the loaded configuration
    pub fn new(config: &Config) -> Self {
        Self::from_secret(
            config.jwt_secret.as_bytes(),
            config.jwt_algorithm,
            Duration::minutes(config.access_token_expire_minutes),
        )
    }

    pub fn from_secret(secret: &[u8], algorithm: Algorithm, expires_in: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret);
        let decoding_key = DecodingKey::from_secret(secret);

        // Expiry is checked against our own clock in `validate_token_at`.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        JwtUtils {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            expires_in,
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in_seconds(&self) -> i64 {
        self.expires_in.num_seconds()
    }

    /// Generate a new JWT token for the given username
    pub fn generate_token(&self, username: &str) -> ServiceResult<String> {
        self.generate_token_at(username, Utc::now())
    }

    pub fn generate_token_at(&self, username: &str, now: DateTime<Utc>) -> ServiceResult<String> {
        let exp = now + self.expires_in;

        let claims = Claims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                ServiceError::unauthorized("Could not validate credentials")
            })?;

        if claims.is_expired_at(now) {
            return Err(ServiceError::unauthorized("Could not validate credentials"));
        }

        if claims.sub.is_empty() {
            return Err(ServiceError::unauthorized("Could not validate credentials"));
        }

        Ok(claims)
    }
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// A token is no longer valid from the second it expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
