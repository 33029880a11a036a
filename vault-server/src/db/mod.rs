//! Database access layer
//!
//! Free functions over `&PgPool` (or an open transaction). Every query that
//! reads or mutates user data filters on `user_id`; a row owned by someone
//! else is indistinguishable from a missing row.

pub mod collections;
pub mod images;
pub mod items;
pub mod profiles;
pub mod users;

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Keep the first occurrence of every id
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
