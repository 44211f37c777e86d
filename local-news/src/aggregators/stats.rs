use crate::types::NewsItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Occurrence counts keyed by case-folded label.
///
/// Labels keep the order in which they were first seen, which is what breaks
/// ties in [`CountTable::top`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountTable {
    entries: Vec<(String, u64)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CountTable {
    pub fn increment(&mut self, label: &str) {
        let key = label.to_lowercase();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.index
            .get(&label.to_lowercase())
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest counts first, ties in first-seen order, at most `limit` entries
    pub fn top(&self, limit: usize) -> Vec<(String, u64)> {
        let mut ranked = self.entries.clone();
        // sort_by is stable, so equal counts stay in insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Snapshot of everything the aggregator tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total_posts: u64,
    pub topic_counts: CountTable,
    pub city_counts: CountTable,
    pub publisher_counts: CountTable,
}

/// Totals plus the ranked lists shown on the stats screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_posts: u64,
    pub top_topics: Vec<(String, u64)>,
    pub top_cities: Vec<(String, u64)>,
    pub top_publishers: Vec<(String, u64)>,
}

/// Running per-topic, per-city and per-publisher counts over published news
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: AggregateStats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: &NewsItem) {
        debug!("Recording stats for news item {}", item.id);

        self.stats.total_posts += 1;
        self.stats.topic_counts.increment(&item.topic);
        self.stats.city_counts.increment(&item.city);
        self.stats.publisher_counts.increment(&item.publisher_first_name);
    }

    pub fn total_posts(&self) -> u64 {
        self.stats.total_posts
    }

    pub fn top_topics(&self, limit: usize) -> Vec<(String, u64)> {
        self.stats.topic_counts.top(limit)
    }

    pub fn top_cities(&self, limit: usize) -> Vec<(String, u64)> {
        self.stats.city_counts.top(limit)
    }

    pub fn top_publishers(&self, limit: usize) -> Vec<(String, u64)> {
        self.stats.publisher_counts.top(limit)
    }

    pub fn summary(&self, limit: usize) -> StatsSummary {
        StatsSummary {
            total_posts: self.total_posts(),
            top_topics: self.top_topics(limit),
            top_cities: self.top_cities(limit),
            top_publishers: self.top_publishers(limit),
        }
    }

    pub fn snapshot(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats.total_posts = 0;
        self.stats.topic_counts.clear();
        self.stats.city_counts.clear();
        self.stats.publisher_counts.clear();
    }

    /// Reset, then replay `items` in their existing order.
    pub fn rebuild<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a NewsItem>,
    {
        self.reset();
        for item in items {
            self.record(item);
        }
        info!("Rebuilt stats from {} news items", self.stats.total_posts);
    }
}
