//! The playback-facing scheduling core.
//!
//! `get_images_for_playback` is the hot path: it must answer from what
//! already exists (indexed reads only) and push all generation work
//! into a detached, deduplicated background batch. The explicit
//! on-demand path (`generate_single`) is the opposite: synchronous,
//! error-propagating, always on the premium tier.

use std::sync::Arc;

use serde::Serialize;
use soundscene_core::planning::{duration_bucket, plan_generation, validate_genre, GenerationPlan};
use soundscene_core::types::DbId;
use soundscene_db::models::generated_image::GeneratedImage;
use soundscene_db::repositories::GeneratedImageRepo;
use soundscene_db::DbPool;
use soundscene_providers::ImageProvider;

use crate::error::OrchestratorError;
use crate::fanout;
use crate::jobs::{GenerationJobMap, JobKey};
use crate::selector::PromptSelector;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Where a returned image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    /// Already existed for the requested genre.
    Precached,
    /// Sampled from other genres to fill a shortfall.
    FallbackRandom,
}

/// One image in a playback response, tagged with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackImage {
    pub id: DbId,
    pub genre: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub generator_name: String,
    pub source: ImageSource,
}

impl PlaybackImage {
    fn from_record(record: GeneratedImage, source: ImageSource) -> Self {
        Self {
            id: record.id,
            genre: record.genre,
            image_url: record.image_url,
            thumbnail_url: record.thumbnail_url,
            generator_name: record.generator_name,
            source,
        }
    }
}

/// Count and share of one provenance bucket in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStat {
    pub count: u32,
    /// Share of the returned set, rounded to whole percent.
    pub percent: u32,
}

/// How the returned set was assembled, plus what the background batch
/// (if any) was asked to produce.
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub total_needed: u32,
    pub returned: u32,
    pub precached: SourceStat,
    pub fallback_random: SourceStat,
    /// Per-tier counts the detached batch will attempt.
    pub plan: GenerationPlan,
}

impl Breakdown {
    fn compute(plan: GenerationPlan, precached: u32, fallback: u32) -> Self {
        let returned = precached + fallback;
        Self {
            total_needed: plan.total_needed,
            returned,
            precached: source_stat(precached, returned),
            fallback_random: source_stat(fallback, returned),
            plan,
        }
    }
}

fn source_stat(count: u32, returned: u32) -> SourceStat {
    let percent = if returned == 0 {
        0
    } else {
        (f64::from(count) / f64::from(returned) * 100.0).round() as u32
    };
    SourceStat { count, percent }
}

/// Full payload for one playback request.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackImages {
    pub images: Vec<PlaybackImage>,
    pub breakdown: Breakdown,
    /// True when the genre's supply was short and a batch is (or was
    /// already) producing more.
    pub generating: bool,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Schedules artwork supply across the three provider tiers.
pub struct GenerationOrchestrator {
    pool: DbPool,
    fast: Arc<dyn ImageProvider>,
    standard: Arc<dyn ImageProvider>,
    premium: Arc<dyn ImageProvider>,
    jobs: Arc<GenerationJobMap>,
}

impl GenerationOrchestrator {
    pub fn new(
        pool: DbPool,
        fast: Arc<dyn ImageProvider>,
        standard: Arc<dyn ImageProvider>,
        premium: Arc<dyn ImageProvider>,
    ) -> Self {
        Self {
            pool,
            fast,
            standard,
            premium,
            jobs: Arc::new(GenerationJobMap::default()),
        }
    }

    /// The in-flight job map, exposed for observability.
    pub fn jobs(&self) -> &Arc<GenerationJobMap> {
        &self.jobs
    }

    /// All configured provider adapters, fast tier first.
    pub fn providers(&self) -> Vec<Arc<dyn ImageProvider>> {
        vec![
            Arc::clone(&self.fast),
            Arc::clone(&self.standard),
            Arc::clone(&self.premium),
        ]
    }

    /// Assemble the image set for one playback of `duration_secs`
    /// seconds in `genre`.
    ///
    /// Never blocks on generation: the response is built entirely from
    /// existing records (same-genre first, cross-genre random fill for
    /// any shortfall). When supply is short, at most one background
    /// batch per `(genre, duration bucket)` is scheduled.
    pub async fn get_images_for_playback(
        &self,
        genre: &str,
        duration_secs: u32,
    ) -> Result<PlaybackImages, OrchestratorError> {
        validate_genre(genre)?;
        let plan = plan_generation(duration_secs);

        let precached = GeneratedImageRepo::list_active_by_genre(
            &self.pool,
            genre,
            i64::from(plan.total_needed),
        )
        .await?;
        let precached_count = precached.len() as u32;

        let shortfall = plan.total_needed.saturating_sub(precached_count);
        let fallback = if shortfall > 0 {
            GeneratedImageRepo::sample_random_active(&self.pool, genre, i64::from(shortfall))
                .await?
        } else {
            Vec::new()
        };
        let fallback_count = fallback.len() as u32;

        let generating = precached_count < plan.total_needed;
        if generating {
            self.schedule_batch(genre, duration_secs, plan).await;
        }

        let images = precached
            .into_iter()
            .map(|r| PlaybackImage::from_record(r, ImageSource::Precached))
            .chain(
                fallback
                    .into_iter()
                    .map(|r| PlaybackImage::from_record(r, ImageSource::FallbackRandom)),
            )
            .collect();

        Ok(PlaybackImages {
            images,
            breakdown: Breakdown::compute(plan, precached_count, fallback_count),
            generating,
        })
    }

    /// Register and launch a background batch unless one is already
    /// live for this `(genre, bucket)` key.
    async fn schedule_batch(&self, genre: &str, duration_secs: u32, plan: GenerationPlan) {
        let key = JobKey::new(genre, duration_bucket(duration_secs));
        if !self.jobs.try_register(key.clone(), plan).await {
            tracing::debug!(
                genre = %genre,
                duration_bucket = key.duration_bucket,
                "Generation batch already in flight, skipping",
            );
            return;
        }

        let _ = fanout::spawn_generation_batch(
            self.pool.clone(),
            genre.to_string(),
            plan,
            Arc::clone(&self.fast),
            Arc::clone(&self.standard),
            Arc::clone(&self.premium),
        );
        self.jobs.spawn_cleanup(key);
    }

    /// Generate exactly one image on the premium tier, synchronously.
    ///
    /// Unlike background units this path propagates every failure to
    /// the caller, including prompt-pool exhaustion and the adapter's
    /// exhausted retry budget.
    pub async fn generate_single(
        &self,
        genre: &str,
        category: Option<&str>,
        song_id: Option<DbId>,
    ) -> Result<GeneratedImage, OrchestratorError> {
        validate_genre(genre)?;
        let prompt = PromptSelector::random(&self.pool, genre, category).await?;
        PromptSelector::record_use(self.pool.clone(), prompt.id);

        let artwork = match self.premium.generate_image(&prompt.prompt_text, genre).await {
            Ok(artwork) => {
                PromptSelector::record_outcome(self.pool.clone(), prompt.id, true);
                artwork
            }
            Err(e) => {
                PromptSelector::record_outcome(self.pool.clone(), prompt.id, false);
                return Err(e.into());
            }
        };

        let record = fanout::persist_artwork(
            &self.pool,
            genre,
            song_id,
            &prompt,
            self.premium.name(),
            &artwork,
        )
        .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_with_full_precached_supply() {
        let plan = plan_generation(200);
        let breakdown = Breakdown::compute(plan, 40, 0);
        assert_eq!(breakdown.total_needed, 40);
        assert_eq!(breakdown.returned, 40);
        assert_eq!(breakdown.precached, SourceStat { count: 40, percent: 100 });
        assert_eq!(breakdown.fallback_random, SourceStat { count: 0, percent: 0 });
    }

    #[test]
    fn breakdown_with_mixed_sources() {
        let plan = plan_generation(200);
        let breakdown = Breakdown::compute(plan, 30, 10);
        assert_eq!(breakdown.returned, 40);
        assert_eq!(breakdown.precached.percent, 75);
        assert_eq!(breakdown.fallback_random.percent, 25);
    }

    #[test]
    fn breakdown_with_nothing_to_return() {
        let plan = plan_generation(60);
        let breakdown = Breakdown::compute(plan, 0, 0);
        assert_eq!(breakdown.returned, 0);
        assert_eq!(breakdown.precached.percent, 0);
        assert_eq!(breakdown.fallback_random.percent, 0);
        assert_eq!(breakdown.plan.total_needed, 12);
    }

    #[test]
    fn source_percent_rounds_to_whole() {
        // 1 of 3 returned images.
        assert_eq!(source_stat(1, 3).percent, 33);
        assert_eq!(source_stat(2, 3).percent, 67);
    }

    #[test]
    fn image_sources_serialize_as_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ImageSource::Precached).unwrap(),
            "\"precached\""
        );
        assert_eq!(
            serde_json::to_string(&ImageSource::FallbackRandom).unwrap(),
            "\"fallback-random\""
        );
    }
}
