//! Pure domain logic for the soundscene artwork platform.
//!
//! This crate has no internal dependencies and no I/O. It holds the
//! generation sizing policy, shared type aliases, and the domain error
//! type used across the workspace.

pub mod error;
pub mod pagination;
pub mod planning;
pub mod types;
