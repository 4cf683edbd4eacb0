//! In-process user store backed by ordered maps.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, PageRequest, Relation, User, UsersList};
use crate::repositories::UserStore;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    /// `(follower_id, followed_id)` edges
    follows: BTreeSet<(i64, i64)>,
}

/// User store living in process memory.
///
/// Uniqueness is checked and the row inserted under a single lock, so two
/// racing registrations for the same login cannot both succeed.
pub struct MemoryUserRepository {
    next_id: AtomicI64,
    tables: Mutex<Tables>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            tables: Mutex::new(Tables::default()),
        }
    }

    fn tables(&self) -> AppResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("user store lock poisoned: {}", e),
        })
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate(field: &str, value: &str) -> AppError {
    AppError::Duplicate {
        entity: "users".to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[async_trait]
impl UserStore for MemoryUserRepository {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn allocate_id(&self) -> AppResult<i64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.tables()?;

        if tables.users.contains_key(&new_user.id) {
            return Err(duplicate("id", &new_user.id.to_string()));
        }
        if tables.users.values().any(|u| u.login == new_user.login) {
            return Err(duplicate("login", &new_user.login));
        }
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(duplicate("email", &new_user.email));
        }

        let user = User::from(new_user);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    async fn find_by_login(&self, user_login: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.login == user_login)
            .cloned())
    }

    async fn find_by_email(&self, user_email: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == user_email)
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        Ok(self.tables()?.users.values().cloned().collect())
    }

    async fn list_related(
        &self,
        subject: i64,
        relation: Relation,
        page: &PageRequest,
    ) -> AppResult<UsersList> {
        let tables = self.tables()?;
        let after = page.after.unwrap_or(i64::MIN);

        let related: BTreeSet<i64> = tables
            .follows
            .iter()
            .filter_map(|&(follower, followed)| match relation {
                Relation::Followees if follower == subject => Some(followed),
                Relation::Followers if followed == subject => Some(follower),
                _ => None,
            })
            .filter(|&id| id > after)
            .collect();

        let rows = related
            .into_iter()
            .filter_map(|id| tables.users.get(&id).cloned())
            .take(page.limit.saturating_add(1))
            .collect();
        Ok(UsersList::from_overfetch(rows, page.limit))
    }

    async fn follow(&self, follower: i64, followed: i64) -> AppResult<()> {
        let mut tables = self.tables()?;

        for user_id in [follower, followed] {
            if !tables.users.contains_key(&user_id) {
                return Err(AppError::Database {
                    operation: "insert follow".to_string(),
                    source: anyhow::anyhow!("user {} does not exist", user_id),
                });
            }
        }
        tables.follows.insert((follower, followed));
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(id: i64, name: &str) -> NewUser {
        NewUser {
            id,
            login: name.to_string(),
            password: "hash".to_string(),
            email: format!("{name}@example.com"),
            avatar: String::new(),
        }
    }

    async fn seeded(count: i64) -> MemoryUserRepository {
        let repo = MemoryUserRepository::new();
        for _ in 0..count {
            let id = repo.allocate_id().await.unwrap();
            repo.insert(new_user(id, &format!("user{id}"))).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_allocated_ids_are_unique() {
        let repo = MemoryUserRepository::new();
        let a = repo.allocate_id().await.unwrap();
        let b = repo.allocate_id().await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_login_and_email() {
        let repo = seeded(1).await;

        let mut same_login = new_user(10, "user1");
        same_login.email = "other@example.com".to_string();
        match repo.insert(same_login).await {
            Err(AppError::Duplicate { field, .. }) => assert_eq!(field, "login"),
            other => panic!("Expected duplicate login, got {:?}", other),
        }

        let mut same_email = new_user(11, "fresh");
        same_email.email = "user1@example.com".to_string();
        match repo.insert(same_email).await {
            Err(AppError::Duplicate { field, .. }) => assert_eq!(field, "email"),
            other => panic!("Expected duplicate email, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_related_pages_in_id_order() {
        let repo = seeded(6).await;
        for followed in [6, 2, 4, 3] {
            repo.follow(1, followed).await.unwrap();
        }
        repo.follow(5, 1).await.unwrap();

        let first = repo
            .list_related(1, Relation::Followees, &PageRequest { limit: 3, after: None })
            .await
            .unwrap();
        assert_eq!(first.users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(first.cursor.is_some());

        let second = repo
            .list_related(1, Relation::Followees, &PageRequest { limit: 3, after: Some(4) })
            .await
            .unwrap();
        assert_eq!(second.users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![6]);
        assert_eq!(second.cursor, None);

        let followers = repo
            .list_related(1, Relation::Followers, &PageRequest { limit: 10, after: None })
            .await
            .unwrap();
        assert_eq!(followers.users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![5]);
    }

    #[tokio::test]
    async fn test_follow_is_idempotent_and_checks_users() {
        let repo = seeded(2).await;
        repo.follow(1, 2).await.unwrap();
        repo.follow(1, 2).await.unwrap();

        let page = repo
            .list_related(2, Relation::Followers, &PageRequest { limit: 10, after: None })
            .await
            .unwrap();
        assert_eq!(page.users.len(), 1);

        assert!(repo.follow(1, 99).await.is_err());
    }
}
