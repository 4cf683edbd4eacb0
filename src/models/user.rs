use diesel::prelude::*;

/// User model for reading from database
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub login: String,
    /// Salted SHA-256 digest, never the plaintext
    pub password: String,
    pub email: String,
    pub avatar: String,
}

/// NewUser model for inserting a registered user.
///
/// The id is allocated up front because it salts the password hash.
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub email: String,
    pub avatar: String,
}

impl From<NewUser> for User {
    fn from(user: NewUser) -> Self {
        Self {
            id: user.id,
            login: user.login,
            password: user.password,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// A follow edge: `follower_id` follows `followed_id`.
#[derive(Debug, Insertable, Queryable, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = crate::schema::follows)]
pub struct Follow {
    pub follower_id: i64,
    pub followed_id: i64,
}
