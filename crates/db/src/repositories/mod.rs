//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod generated_image_repo;
pub mod prompt_repo;

pub use generated_image_repo::GeneratedImageRepo;
pub use prompt_repo::PromptRepo;
