mod page;
mod user;

pub use page::{PageRequest, Relation, UsersList};
pub use user::{Follow, NewUser, User};
