//! Leaf helpers used by the user service: field rules, digests, cursors
//! and bearer tokens.

pub mod avatar;
pub mod cursor;
pub mod jwt;
pub mod password;
pub mod validate;
