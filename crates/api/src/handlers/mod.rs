//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the orchestrator or the repositories in
//! `soundscene_db` and map errors via [`crate::error::AppError`].

pub mod images;
pub mod playback;
pub mod prompts;
