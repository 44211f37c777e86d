use crate::aggregators::stats::{StatsAggregator, StatsSummary};
use crate::moderation::Moderator;
use crate::store::{NewsStore, StoreAnalytics};
use crate::types::{
    ModerationResult, NewsError, NewsItem, Result, SubmissionDraft, SubmissionOutcome,
};
use crate::validation::validate_draft;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Submission pipeline that coordinates moderation, stats and the news store.
///
/// Every mutation takes `&mut self`, so the store and the counters always
/// change together. Share it across tasks behind a `tokio::sync::Mutex`.
pub struct SubmissionPipeline {
    store: NewsStore,
    moderator: Box<dyn Moderator>,
    stats: StatsAggregator,
}

impl SubmissionPipeline {
    /// Wrap a loaded store, replaying its collection (seeded samples included)
    /// into fresh stats
    pub fn open(store: NewsStore, moderator: Box<dyn Moderator>) -> Self {
        info!(
            "Opening submission pipeline with {} ({} news items, seeded: {})",
            moderator.moderator_name(),
            store.news().len(),
            store.was_seeded()
        );

        let mut stats = StatsAggregator::new();
        stats.rebuild(store.news());

        Self {
            store,
            moderator,
            stats,
        }
    }

    /// Validate, moderate and, when approved, publish a draft.
    ///
    /// Rejections come back as [`SubmissionOutcome::Rejected`]. A failed
    /// moderation call or a failed save leaves the store and stats untouched,
    /// so the draft can simply be submitted again.
    pub async fn submit(&mut self, draft: SubmissionDraft) -> Result<SubmissionOutcome> {
        validate_draft(&draft).map_err(NewsError::InvalidSubmission)?;

        let decision = self.moderator.evaluate(&draft).await.map_err(|e| {
            warn!("Moderation failed for \"{}\": {}", draft.title, e);
            NewsError::ValidationFailed
        })?;

        match decision {
            ModerationResult::Approved {
                edited_title,
                edited_summary,
                reason,
            } => {
                let item = NewsItem {
                    id: Uuid::new_v4().to_string(),
                    original_title: Some(draft.title),
                    original_description: Some(draft.description),
                    edited_title,
                    edited_summary,
                    city: draft.city,
                    topic: draft.topic,
                    publisher_first_name: draft.publisher_name,
                    publisher_phone: draft.publisher_phone,
                    image: draft.image,
                    timestamp: Utc::now(),
                    moderation_reason: Some(reason),
                };

                // Count only what was actually persisted
                self.store.add_news(item.clone()).await?;
                self.stats.record(&item);

                Ok(SubmissionOutcome::Published(item))
            }
            ModerationResult::Rejected { kind, reason } => {
                info!("Submission \"{}\" rejected: {:?}", draft.title, kind);
                Ok(SubmissionOutcome::Rejected { kind, reason })
            }
        }
    }

    /// Wipe the counters and replay every stored item in collection order
    pub fn reinitialize_stats(&mut self) {
        self.stats.rebuild(self.store.news());
    }

    /// Rebuild stats if their total disagrees with the collection size.
    /// Returns whether a rebuild happened.
    pub fn ensure_stats_consistent(&mut self) -> bool {
        let stored = self.store.news().len() as u64;
        if self.stats.total_posts() == stored {
            return false;
        }

        warn!(
            "Stats count {} does not match {} stored items, reinitializing",
            self.stats.total_posts(),
            stored
        );
        self.reinitialize_stats();
        true
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsAggregator {
        &mut self.stats
    }

    pub fn stats_summary(&self, limit: usize) -> StatsSummary {
        self.stats.summary(limit)
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NewsStore {
        &mut self.store
    }

    pub fn analytics(&self) -> StoreAnalytics {
        self.store.analytics()
    }
}
