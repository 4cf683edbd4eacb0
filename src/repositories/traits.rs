//! UserStore trait definition.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewUser, PageRequest, Relation, User, UsersList};

/// Trait for user storage operations.
///
/// Backends own id allocation and enforce login/email uniqueness at write
/// time; a conflicting insert fails with `AppError::Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for logs and probes.
    fn kind(&self) -> &'static str;

    /// Reserves a fresh, never reused user id.
    async fn allocate_id(&self) -> AppResult<i64>;

    /// Persists a registered user under its pre-allocated id.
    async fn insert(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>>;

    async fn find_by_login(&self, user_login: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, user_email: &str) -> AppResult<Option<User>>;

    /// Lists every user in ascending id order.
    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Lists one page of the users related to `subject`, ascending by id.
    async fn list_related(
        &self,
        subject: i64,
        relation: Relation,
        page: &PageRequest,
    ) -> AppResult<UsersList>;

    /// Records that `follower` follows `followed`. Repeating an edge is a no-op.
    async fn follow(&self, follower: i64, followed: i64) -> AppResult<()>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> AppResult<()>;
}
