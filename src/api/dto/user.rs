//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::User;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for registering a new user.
///
/// Field rules are enforced by the service so that violations are reported
/// in a fixed order; the schema only documents them.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(min_length = 4, max_length = 20, pattern = "^[A-Za-z0-9_-]+$", example = "alice")]
    pub login: String,
    #[schema(format = "password", min_length = 6, max_length = 64)]
    pub password: String,
    #[schema(format = "email", max_length = 254, example = "alice@example.com")]
    pub email: String,
}

/// Relationship filters for `GET /users`.
///
/// Both take a user id or `me`. When both are present only `followedBy`
/// is applied. A repeated parameter keeps its first value.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    /// List the users this subject follows
    #[serde(rename = "followedBy")]
    #[param(rename = "followedBy", example = "me")]
    pub followed_by: Option<String>,
    /// List the followers of this subject
    #[serde(rename = "followerOf")]
    #[param(rename = "followerOf", example = "42")]
    pub follower_of: Option<String>,
}

impl UsersQuery {
    /// Builds the filters from raw query pairs, first occurrence wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "followedBy" => &mut query.followed_by,
                "followerOf" => &mut query.follower_of,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Public user representation; the password hash is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub login: String,
    pub email: String,
    #[schema(example = "http://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?d=wavatar")]
    pub avatar: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            email: user.email,
            avatar: user.avatar,
        }
    }
}
