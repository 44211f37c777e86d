use crate::traits::SlotStorage;
use crate::types::{NewsError, NewsFilters, NewsItem, Result};
use crate::utils::text::matches_query;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NEWS_SLOT: &str = "news";
pub const BOOKMARKS_SLOT: &str = "bookmarks";

/// Collection-level numbers for the analytics dashboard. Labels are kept as
/// published, not case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAnalytics {
    pub total_news: usize,
    pub total_bookmarks: usize,
    pub total_cities: usize,
    pub total_topics: usize,
    pub news_by_city: BTreeMap<String, usize>,
    pub news_by_topic: BTreeMap<String, usize>,
}

/// Owned news collection, bookmarks and feed filters, persisted through a
/// [`SlotStorage`] under the `news` and `bookmarks` slots.
pub struct NewsStore {
    storage: Arc<dyn SlotStorage>,
    news: Vec<NewsItem>,
    bookmarks: Vec<String>,
    filters: NewsFilters,
    seeded: bool,
}

impl NewsStore {
    /// Load both slots, seeding sample news when nothing was saved yet
    pub async fn load(storage: Arc<dyn SlotStorage>) -> Result<Self> {
        let saved_news = storage.get_item(NEWS_SLOT).await?;
        let saved_bookmarks = storage.get_item(BOOKMARKS_SLOT).await?;

        let (news, seeded) = match saved_news {
            Some(json) => (serde_json::from_str::<Vec<NewsItem>>(&json)?, false),
            None => {
                info!("No saved news in {} storage, seeding samples", storage.backend_name());
                (sample_news(), true)
            }
        };

        let bookmarks = match saved_bookmarks {
            Some(json) => serde_json::from_str::<Vec<String>>(&json)?,
            None => Vec::new(),
        };

        info!("Loaded {} news items and {} bookmarks", news.len(), bookmarks.len());

        let store = Self {
            storage,
            news,
            bookmarks,
            filters: NewsFilters::default(),
            seeded,
        };

        if seeded {
            store.save().await?;
        }

        Ok(store)
    }

    /// Whether the collection was seeded with samples on load
    pub fn was_seeded(&self) -> bool {
        self.seeded
    }

    pub async fn save(&self) -> Result<()> {
        self.save_news().await?;
        self.save_bookmarks().await
    }

    async fn save_news(&self) -> Result<()> {
        let news = serde_json::to_string(&self.news)?;
        self.storage.set_item(NEWS_SLOT, &news).await?;
        debug!("Saved {} news items", self.news.len());
        Ok(())
    }

    async fn save_bookmarks(&self) -> Result<()> {
        let bookmarks = serde_json::to_string(&self.bookmarks)?;
        self.storage.set_item(BOOKMARKS_SLOT, &bookmarks).await?;
        debug!("Saved {} bookmarks", self.bookmarks.len());
        Ok(())
    }

    /// Newest first
    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    pub fn bookmarks(&self) -> &[String] {
        &self.bookmarks
    }

    pub fn get(&self, id: &str) -> Option<&NewsItem> {
        self.news.iter().find(|item| item.id == id)
    }

    pub async fn add_news(&mut self, item: NewsItem) -> Result<()> {
        info!("Publishing news item {}: {}", item.id, item.edited_title);
        self.news.insert(0, item);

        // Memory only keeps the item once it is on disk
        if let Err(e) = self.save_news().await {
            warn!("Failed to save news, dropping unsaved item: {}", e);
            self.news.remove(0);
            return Err(e);
        }
        Ok(())
    }

    /// Flip the bookmark on an item, returning whether it is now bookmarked
    pub async fn toggle_bookmark(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
            return Err(NewsError::NewsNotFound { id: id.to_string() });
        }

        let position = self.bookmarks.iter().position(|b| b == id);
        match position {
            Some(position) => {
                self.bookmarks.remove(position);
            }
            None => self.bookmarks.push(id.to_string()),
        }

        if let Err(e) = self.save_bookmarks().await {
            warn!("Failed to save bookmarks, undoing toggle for {}: {}", id, e);
            match position {
                Some(position) => self.bookmarks.insert(position, id.to_string()),
                None => {
                    self.bookmarks.pop();
                }
            }
            return Err(e);
        }

        let bookmarked = position.is_none();
        debug!("Bookmark for {} is now {}", id, bookmarked);
        Ok(bookmarked)
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|b| b == id)
    }

    pub fn filters(&self) -> &NewsFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: NewsFilters) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = NewsFilters::default();
    }

    /// Free-text search over title, summary, city, topic and publisher, then
    /// the exact city/topic filters. A blank query matches everything.
    pub fn filtered_news(&self, query: &str) -> Vec<&NewsItem> {
        let query = query.trim();
        let city = self.filters.city.to_lowercase();
        let topic = self.filters.topic.to_lowercase();

        self.news
            .iter()
            .filter(|item| {
                query.is_empty()
                    || [
                        &item.edited_title,
                        &item.edited_summary,
                        &item.city,
                        &item.topic,
                        &item.publisher_first_name,
                    ]
                    .iter()
                    .any(|field| matches_query(field, query))
            })
            .filter(|item| city.is_empty() || item.city.to_lowercase() == city)
            .filter(|item| topic.is_empty() || item.topic.to_lowercase() == topic)
            .collect()
    }

    pub fn bookmarked_news(&self) -> Vec<&NewsItem> {
        self.news
            .iter()
            .filter(|item| self.is_bookmarked(&item.id))
            .collect()
    }

    /// Distinct city labels across the whole collection, sorted
    pub fn cities(&self) -> Vec<String> {
        let cities: BTreeSet<&str> = self.news.iter().map(|item| item.city.as_str()).collect();
        cities.into_iter().map(str::to_string).collect()
    }

    /// Distinct topic labels across the whole collection, sorted
    pub fn topics(&self) -> Vec<String> {
        let topics: BTreeSet<&str> = self.news.iter().map(|item| item.topic.as_str()).collect();
        topics.into_iter().map(str::to_string).collect()
    }

    pub fn analytics(&self) -> StoreAnalytics {
        let mut news_by_city = BTreeMap::new();
        let mut news_by_topic = BTreeMap::new();

        for item in &self.news {
            *news_by_city.entry(item.city.clone()).or_insert(0) += 1;
            *news_by_topic.entry(item.topic.clone()).or_insert(0) += 1;
        }

        StoreAnalytics {
            total_news: self.news.len(),
            total_bookmarks: self.bookmarks.len(),
            total_cities: news_by_city.len(),
            total_topics: news_by_topic.len(),
            news_by_city,
            news_by_topic,
        }
    }
}

/// Bootstrap content for a fresh install. These never pass through moderation.
pub fn sample_news() -> Vec<NewsItem> {
    let now = Utc::now();
    let sample = |id: &str,
                  title: &str,
                  summary: &str,
                  city: &str,
                  topic: &str,
                  publisher: &str,
                  phone: &str,
                  days_ago: i64| NewsItem {
        id: id.to_string(),
        original_title: None,
        original_description: None,
        edited_title: title.to_string(),
        edited_summary: summary.to_string(),
        city: city.to_string(),
        topic: topic.to_string(),
        publisher_first_name: publisher.to_string(),
        publisher_phone: phone.to_string(),
        image: None,
        timestamp: now - Duration::days(days_ago),
        moderation_reason: None,
    };

    vec![
        sample(
            "1",
            "Local Community Festival Draws Hundreds",
            "The annual community festival in downtown attracted over 500 attendees this weekend. The event featured local musicians, food vendors, and family activities.",
            "Mumbai",
            "Festival",
            "John",
            "9876543210",
            1,
        ),
        sample(
            "2",
            "Major Traffic Accident on Main Street",
            "A serious traffic accident occurred on Main Street this morning, causing delays for commuters. Emergency services responded quickly.",
            "Delhi",
            "Accident",
            "Sarah",
            "9876543211",
            2,
        ),
        sample(
            "3",
            "New Community Center Opens",
            "The new community center officially opened its doors today, providing a space for local events and activities.",
            "Mumbai",
            "Community Event",
            "Mike",
            "9876543212",
            3,
        ),
        sample(
            "4",
            "Local Restaurant Wins Award",
            "A popular local restaurant has won the Best Local Cuisine award for the third year in a row.",
            "Delhi",
            "Local News",
            "Lisa",
            "9876543213",
            4,
        ),
    ]
}
