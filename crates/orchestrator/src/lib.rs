//! Generation orchestration: the scheduler that decides what artwork a
//! playback request gets *now* and what the provider tiers should
//! produce *next*.
//!
//! The public entry point ([`GenerationOrchestrator`]) is synchronous
//! and fast -- one indexed read plus an optional random sample.
//! Everything downstream of "supply is short" runs as detached
//! background work deduplicated per `(genre, duration bucket)` by an
//! in-memory job map with TTL cleanup.

pub mod catalog;
pub mod error;
mod fanout;
pub mod jobs;
pub mod orchestrator;
pub mod selector;

pub use catalog::{CatalogClient, HttpCatalogClient, TrackInfo};
pub use error::OrchestratorError;
pub use fanout::log_provider_availability;
pub use jobs::{GenerationJob, GenerationJobMap, JobKey};
pub use orchestrator::{
    Breakdown, GenerationOrchestrator, ImageSource, PlaybackImage, PlaybackImages, SourceStat,
};
pub use selector::PromptSelector;
