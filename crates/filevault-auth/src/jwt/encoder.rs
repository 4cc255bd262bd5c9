//! JWT token creation.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::types::UserId;

use super::claims::Claims;

/// Creates signed HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime.
    lifetime: chrono::Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates an encoder from the secret and lifetime in the configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes(), config.token_lifetime())
    }

    /// Creates an encoder from raw parts.
    pub fn from_secret(secret: &[u8], lifetime: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            lifetime,
        }
    }

    /// Generates a token for the given user, expiring `lifetime` from now.
    pub fn generate_token(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<(String, Claims), AppError> {
        let claims = Claims {
            id: user_id,
            name: name.to_string(),
            admin: true,
            expires_at: (Utc::now() + self.lifetime).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, claims))
    }
}
