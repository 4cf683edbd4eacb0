use crate::error::{AppError, AppResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims binding a bearer token to a user id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user, valid for `expiration_hours` from now.
    pub fn new(user_id: i64, expiration_hours: i64) -> Self {
        let now = jiff::Timestamp::now().as_second();

        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(expiration_hours.saturating_mul(3600)),
        }
    }

    /// The user id named by the token.
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub.parse().map_err(|_| AppError::Unauthorized {
            message: "Invalid user ID in token".to_string(),
        })
    }
}

/// Issues a signed token for a user.
///
/// # Example
/// ```ignore
/// let token = generate_token(1, "secret", 168)?;
/// ```
pub fn generate_token(user_id: i64, secret: &str, expiration_hours: i64) -> AppResult<String> {
    let claims = Claims::new(user_id, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates and decodes a token.
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: format!("Token validation failed: {}", e),
        },
    })
}

/// Resolves a token straight to the user id it was issued for.
pub fn resolve_user_id(token: &str, secret: &str) -> AppResult<i64> {
    validate_token(token, secret)?.user_id()
}
