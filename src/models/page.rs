use crate::models::User;
use crate::utils::cursor;

/// Direction of a relationship query around a subject user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Users the subject follows (`followedBy=<subject>`)
    Followees,
    /// Users following the subject (`followerOf=<subject>`)
    Followers,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Followees => "followees",
            Relation::Followers => "followers",
        }
    }
}

/// A resolved page request: a concrete limit and the id to resume after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub after: Option<i64>,
}

/// One page of users plus the cursor to fetch the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsersList {
    pub users: Vec<User>,
    /// `None` once the listing is exhausted
    pub cursor: Option<String>,
}

impl UsersList {
    /// Builds a page from a query that fetched up to `limit + 1` rows in id
    /// order; the extra row only signals that another page exists.
    pub fn from_overfetch(mut users: Vec<User>, limit: usize) -> Self {
        if users.len() > limit {
            users.truncate(limit);
            let cursor = users.last().map(|user| cursor::encode(user.id));
            Self { users, cursor }
        } else {
            Self {
                users,
                cursor: None,
            }
        }
    }
}
