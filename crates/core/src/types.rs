//! Shared type aliases used across all workspace crates.

/// Internal database row identifier.
pub type DbId = i64;

/// UTC timestamp as stored in the database.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
