//! In-memory deduplication of background generation batches.
//!
//! Many listeners requesting the same genre/duration combination in a
//! short window must trigger at most one generation batch. The map is
//! the only shared mutable structure in the orchestration core;
//! entries expire after a fixed TTL regardless of whether the batch's
//! units finished, so a stuck provider can never permanently block a
//! key. This replaces any form of distributed lock: within one process
//! the check-and-insert is atomic under the write lock, across
//! processes a duplicate batch is accepted and bounded by the TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use soundscene_core::planning::GenerationPlan;
use soundscene_core::types::Timestamp;
use tokio::sync::RwLock;

/// How long a job entry blocks re-registration of its key.
pub const JOB_TTL: Duration = Duration::from_secs(120);

/// Dedup key: one live batch per genre per duration bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub genre: String,
    pub duration_bucket: u32,
}

impl JobKey {
    pub fn new(genre: impl Into<String>, duration_bucket: u32) -> Self {
        Self {
            genre: genre.into(),
            duration_bucket,
        }
    }
}

/// Bookkeeping for one in-flight generation batch. Never persisted.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub genre: String,
    pub started_at: Timestamp,
    /// Planned per-tier counts for the batch.
    pub plan: GenerationPlan,
}

/// Tracks in-flight generation batches keyed by `(genre, bucket)`.
pub struct GenerationJobMap {
    jobs: RwLock<HashMap<JobKey, GenerationJob>>,
    ttl: Duration,
}

impl Default for GenerationJobMap {
    fn default() -> Self {
        Self::with_ttl(JOB_TTL)
    }
}

impl GenerationJobMap {
    /// Create a map with a custom TTL (tests use short ones).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a job for `key` unless one is already live.
    ///
    /// Check and insert happen under one write lock, so within this
    /// process at most one batch wins per key.
    pub async fn try_register(&self, key: JobKey, plan: GenerationPlan) -> bool {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&key) {
            return false;
        }
        let job = GenerationJob {
            genre: key.genre.clone(),
            started_at: chrono::Utc::now(),
            plan,
        };
        jobs.insert(key, job);
        true
    }

    /// Whether a live job exists for `key`.
    pub async fn contains(&self, key: &JobKey) -> bool {
        self.jobs.read().await.contains_key(key)
    }

    /// Remove a job entry, freeing its key for future batches.
    pub async fn remove(&self, key: &JobKey) {
        self.jobs.write().await.remove(key);
    }

    /// Number of live job entries.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Spawn the detached cleanup task that removes `key` after the
    /// TTL elapses -- deliberately independent of whether the batch's
    /// generation units have finished.
    pub fn spawn_cleanup(self: &Arc<Self>, key: JobKey) -> tokio::task::JoinHandle<()> {
        let map = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(map.ttl).await;
            map.remove(&key).await;
            tracing::debug!(
                genre = %key.genre,
                duration_bucket = key.duration_bucket,
                "Generation job entry expired",
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundscene_core::planning::plan_generation;

    fn key() -> JobKey {
        JobKey::new("techno", 3)
    }

    #[tokio::test]
    async fn first_registration_wins() {
        let map = GenerationJobMap::default();
        assert!(map.try_register(key(), plan_generation(200)).await);
        assert!(map.contains(&key()).await);
    }

    #[tokio::test]
    async fn second_registration_rejected_while_live() {
        let map = GenerationJobMap::default();
        assert!(map.try_register(key(), plan_generation(200)).await);
        assert!(!map.try_register(key(), plan_generation(200)).await);
        assert_eq!(map.len().await, 1);
    }

    #[tokio::test]
    async fn different_buckets_do_not_collide() {
        let map = GenerationJobMap::default();
        assert!(map.try_register(JobKey::new("techno", 1), plan_generation(90)).await);
        assert!(map.try_register(JobKey::new("techno", 2), plan_generation(150)).await);
        assert_eq!(map.len().await, 2);
    }

    #[tokio::test]
    async fn remove_frees_the_key() {
        let map = GenerationJobMap::default();
        assert!(map.try_register(key(), plan_generation(200)).await);
        map.remove(&key()).await;
        assert!(map.try_register(key(), plan_generation(200)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_expires_entry_after_ttl() {
        let map = Arc::new(GenerationJobMap::with_ttl(Duration::from_secs(120)));
        assert!(map.try_register(key(), plan_generation(200)).await);

        let handle = map.spawn_cleanup(key());
        handle.await.unwrap();

        // The key is free again even though no unit "completed".
        assert!(!map.contains(&key()).await);
        assert!(map.try_register(key(), plan_generation(200)).await);
    }
}
