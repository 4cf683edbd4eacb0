//! User service for business logic operations.
//!
//! Owns the registration flow and relationship listings, coordinating
//! validation, digests and the user store.

use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, PageRequest, Relation, User, UsersList};
use crate::repositories::UserStore;
use crate::utils::validate::{ValidationError, validate_registration};
use crate::utils::{avatar, cursor, password};

/// User service for handling user-related business logic.
///
/// Cloning is cheap: the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    pagination: PaginationConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// Registers a new user.
    ///
    /// Checks run in order and the first failure wins: login, password and
    /// email format, then login and email availability. Only then is an id
    /// allocated, the avatar derived and the password hashed with the id as
    /// salt. A uniqueness violation raised by the store on insert (a racing
    /// registration) is reported exactly like the availability checks.
    pub async fn register(&self, login: &str, plain_password: &str, email: &str) -> AppResult<User> {
        validate_registration(login, plain_password, email)?;

        if self.store.find_by_login(login).await?.is_some() {
            return Err(ValidationError::DuplicateLogin.into());
        }
        if self.store.find_by_email(email).await?.is_some() {
            return Err(ValidationError::DuplicateEmail.into());
        }

        let id = self.store.allocate_id().await?;
        let new_user = NewUser {
            id,
            login: login.to_string(),
            avatar: avatar::avatar_url(email),
            password: password::hash_password(plain_password, id),
            email: email.to_string(),
        };

        let user = self
            .store
            .insert(new_user)
            .await
            .map_err(registration_conflict)?;

        tracing::info!(user_id = user.id, login = %user.login, "User registered");
        Ok(user)
    }

    /// Lists all users.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list_all().await
    }

    /// Gets a user by id, `None` when unknown.
    pub async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        self.store.find_by_id(id).await
    }

    /// Lists one page of the users `subject` follows, or of its followers.
    ///
    /// # Arguments
    /// * `limit` - Requested page size; the default applies when absent or
    ///   non-positive and larger values are clamped to the configured maximum
    /// * `continuation` - Cursor from a previous page
    pub async fn list_related(
        &self,
        subject: i64,
        relation: Relation,
        limit: Option<i64>,
        continuation: Option<&str>,
    ) -> AppResult<UsersList> {
        let page = self.page_request(limit, continuation)?;
        tracing::debug!(
            user_id = subject,
            relation = relation.as_str(),
            limit = page.limit,
            "Listing related users"
        );
        self.store.list_related(subject, relation, &page).await
    }

    /// Resolves raw client paging input into a concrete request.
    pub fn page_request(
        &self,
        limit: Option<i64>,
        continuation: Option<&str>,
    ) -> AppResult<PageRequest> {
        let limit = match limit.and_then(|l| usize::try_from(l).ok()) {
            Some(l) if l > 0 => l.min(self.pagination.max_limit),
            _ => self.pagination.default_limit,
        };
        let after = continuation
            .map(cursor::decode)
            .transpose()
            .map_err(|e| AppError::invalid_request(e.to_string()))?;

        Ok(PageRequest { limit, after })
    }

    /// Records a follow edge between two existing users.
    pub async fn follow(&self, follower: i64, followed: i64) -> AppResult<()> {
        self.store.follow(follower, followed).await
    }

    /// Name of the backing store.
    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// Checks that the store answers.
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

/// Maps a store-level uniqueness violation on login or email to the
/// registration error the pre-checks would have produced.
fn registration_conflict(error: AppError) -> AppError {
    match error {
        AppError::Duplicate { ref field, .. } if field == "login" => {
            ValidationError::DuplicateLogin.into()
        }
        AppError::Duplicate { ref field, .. } if field == "email" => {
            ValidationError::DuplicateEmail.into()
        }
        other => other,
    }
}
