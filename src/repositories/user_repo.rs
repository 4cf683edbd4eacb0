//! PostgreSQL user store.
//!
//! Provides the users and follows queries using diesel_async.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{Follow, NewUser, PageRequest, Relation, User, UsersList};
use crate::repositories::UserStore;

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap
/// (just reference count increment).
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn allocate_id(&self) -> AppResult<i64> {
        let mut conn = self.pool.get().await?;

        let next_id = diesel::select(diesel::dsl::sql::<BigInt>("nextval('users_id_seq')"))
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(next_id)
    }

    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let user = diesel::insert_into(users)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let user = users
            .filter(id.eq(user_id))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn find_by_login(&self, user_login: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let user = users
            .filter(login.eq(user_login))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn find_by_email(&self, user_email: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let user = users
            .filter(email.eq(user_email))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let all = users
            .select(User::as_select())
            .order(id.asc())
            .load(&mut conn)
            .await?;
        Ok(all)
    }

    async fn list_related(
        &self,
        subject: i64,
        relation: Relation,
        page: &PageRequest,
    ) -> AppResult<UsersList> {
        use crate::schema::follows;
        use crate::schema::users;
        let mut conn = self.pool.get().await?;

        let mut query = users::table.select(User::as_select()).into_boxed();
        query = match relation {
            Relation::Followees => query.filter(
                users::id.eq_any(
                    follows::table
                        .filter(follows::follower_id.eq(subject))
                        .select(follows::followed_id),
                ),
            ),
            Relation::Followers => query.filter(
                users::id.eq_any(
                    follows::table
                        .filter(follows::followed_id.eq(subject))
                        .select(follows::follower_id),
                ),
            ),
        };
        if let Some(after) = page.after {
            query = query.filter(users::id.gt(after));
        }

        // One extra row tells whether another page exists.
        let fetch = i64::try_from(page.limit.saturating_add(1)).unwrap_or(i64::MAX);
        let rows = query
            .order(users::id.asc())
            .limit(fetch)
            .load(&mut conn)
            .await?;
        Ok(UsersList::from_overfetch(rows, page.limit))
    }

    async fn follow(&self, follower: i64, followed: i64) -> AppResult<()> {
        use crate::schema::follows::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(follows)
            .values(&Follow {
                follower_id: follower,
                followed_id: followed,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
