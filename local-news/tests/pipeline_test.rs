use async_trait::async_trait;
use local_news::store::NEWS_SLOT;
use local_news::{
    types::*, MemorySlotStorage, Moderator, NewsStore, RuleModerator, SlotStorage,
    SubmissionPipeline, DEFAULT_TOP_LIMIT,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Moderator whose replies never parse
struct GarbledModerator;

#[async_trait]
impl Moderator for GarbledModerator {
    fn moderator_name(&self) -> String {
        "garbled".to_string()
    }

    async fn evaluate(&self, _draft: &SubmissionDraft) -> Result<ModerationResult> {
        let reply = serde_json::from_str::<ModerationResult>("<html>502 Bad Gateway</html>")?;
        Ok(reply)
    }
}

/// Memory storage whose writes can be switched off after loading
#[derive(Default)]
struct FlakyStorage {
    inner: MemorySlotStorage,
    fail_writes: AtomicBool,
}

#[async_trait]
impl SlotStorage for FlakyStorage {
    fn backend_name(&self) -> String {
        "flaky".to_string()
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(NewsError::Database(sqlx::Error::Io(std::io::Error::other(
                "disk full",
            ))));
        }
        self.inner.set_item(key, value).await
    }
}

fn festival_draft() -> SubmissionDraft {
    SubmissionDraft {
        title: "Community Festival".to_string(),
        description: "The annual community festival in downtown attracted over 500 attendees this weekend. The event featured local musicians, food vendors, and family activities. Organizers reported record attendance.".to_string(),
        city: "Downtown".to_string(),
        topic: "Festival".to_string(),
        publisher_name: "John".to_string(),
        publisher_phone: "98765-43210".to_string(),
        image: Some("file:///photos/festival.jpg".to_string()),
    }
}

fn spam_draft() -> SubmissionDraft {
    SubmissionDraft {
        title: "Buy now click here".to_string(),
        description: "This is spam content that should be rejected by the AI validation system.".to_string(),
        city: "Anywhere".to_string(),
        topic: "Local News".to_string(),
        publisher_name: "Spammer".to_string(),
        publisher_phone: "1234567890".to_string(),
        image: None,
    }
}

async fn open_pipeline(storage: Arc<MemorySlotStorage>) -> Result<SubmissionPipeline> {
    let store = NewsStore::load(storage).await?;
    let moderator = RuleModerator::new("test".to_string()).with_delay(0);
    Ok(SubmissionPipeline::open(store, Box::new(moderator)))
}

fn pairs(rows: &[(&str, u64)]) -> Vec<(String, u64)> {
    rows.iter().map(|(label, count)| (label.to_string(), *count)).collect()
}

#[tokio::test]
async fn test_seeded_samples_are_counted() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let pipeline = open_pipeline(Arc::new(MemorySlotStorage::new())).await?;

    assert!(pipeline.store().was_seeded());
    assert_eq!(pipeline.stats().total_posts(), 4);
    assert_eq!(
        pipeline.stats().top_cities(DEFAULT_TOP_LIMIT),
        pairs(&[("mumbai", 2), ("delhi", 2)])
    );
    assert_eq!(
        pipeline.stats().top_topics(DEFAULT_TOP_LIMIT),
        pairs(&[
            ("festival", 1),
            ("accident", 1),
            ("community event", 1),
            ("local news", 1)
        ])
    );

    Ok(())
}

#[tokio::test]
async fn test_approved_submission_is_published_and_counted() -> Result<()> {
    let storage = Arc::new(MemorySlotStorage::new());
    let mut pipeline = open_pipeline(storage.clone()).await?;

    let outcome = pipeline.submit(festival_draft()).await?;
    let item = match outcome {
        SubmissionOutcome::Published(item) => item,
        other => panic!("expected publication, got {:?}", other),
    };

    info!("Published {} as {}", item.id, item.edited_title);
    assert_eq!(item.edited_title, "Community Community Festival");
    assert_eq!(
        item.edited_summary,
        "The annual community festival in downtown attracted over 500 attendees this weekend. The event featured local musicians, food vendors, and family activities."
    );
    assert_eq!(item.original_title.as_deref(), Some("Community Festival"));
    assert_eq!(item.publisher_first_name, "John");
    assert_eq!(item.publisher_phone, "98765-43210");
    assert_eq!(item.image.as_deref(), Some("file:///photos/festival.jpg"));
    assert_eq!(item.moderation_reason.as_deref(), Some(APPROVAL_REASON));
    assert!(!item.id.is_empty());

    assert_eq!(pipeline.store().news().len(), 5);
    assert_eq!(pipeline.store().news()[0].id, item.id);
    assert_eq!(pipeline.stats().total_posts(), 5);
    assert_eq!(pipeline.stats().snapshot().topic_counts.get("festival"), 2);
    assert_eq!(pipeline.stats().snapshot().city_counts.get("downtown"), 1);

    // Persisted straight away
    let saved = storage.get_item(NEWS_SLOT).await?.expect("news slot written");
    assert!(saved.contains(&item.id));

    // Two submissions never share an id
    let second = pipeline.submit(festival_draft()).await?;
    match second {
        SubmissionOutcome::Published(other) => assert_ne!(other.id, item.id),
        other => panic!("expected publication, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_rejected_submission_changes_nothing() -> Result<()> {
    let storage = Arc::new(MemorySlotStorage::new());
    let mut pipeline = open_pipeline(storage.clone()).await?;
    let before = pipeline.stats().snapshot().clone();
    let saved_before = storage.get_item(NEWS_SLOT).await?;

    match pipeline.submit(spam_draft()).await? {
        SubmissionOutcome::Rejected { kind, reason } => {
            assert_eq!(kind, RejectionKind::Spam);
            assert_eq!(reason, RejectionKind::Spam.reason());
        }
        other => panic!("expected rejection, got {:?}", other),
    }

    assert_eq!(pipeline.store().news().len(), 4);
    assert_eq!(pipeline.stats().snapshot(), &before);
    assert_eq!(storage.get_item(NEWS_SLOT).await?, saved_before);

    Ok(())
}

#[tokio::test]
async fn test_invalid_form_is_stopped_before_moderation() -> Result<()> {
    let mut pipeline = open_pipeline(Arc::new(MemorySlotStorage::new())).await?;

    let mut draft = festival_draft();
    draft.publisher_phone = "12345".to_string();
    draft.city = "  ".to_string();

    match pipeline.submit(draft).await {
        Err(NewsError::InvalidSubmission(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected invalid submission, got {:?}", other),
    }
    assert_eq!(pipeline.stats().total_posts(), 4);

    Ok(())
}

#[tokio::test]
async fn test_moderation_failure_leaves_state_untouched() -> Result<()> {
    let storage = Arc::new(MemorySlotStorage::new());
    let store = NewsStore::load(storage.clone()).await?;
    let mut pipeline = SubmissionPipeline::open(store, Box::new(GarbledModerator));
    let before = pipeline.stats().snapshot().clone();
    let saved_before = storage.get_item(NEWS_SLOT).await?;

    let err = match pipeline.submit(festival_draft()).await {
        Err(err) => err,
        Ok(outcome) => panic!("expected failure, got {:?}", outcome),
    };

    assert!(matches!(err, NewsError::ValidationFailed));
    assert_eq!(err.to_string(), "Failed to validate news. Please try again later.");
    assert_eq!(pipeline.store().news().len(), 4);
    assert_eq!(pipeline.stats().snapshot(), &before);
    assert_eq!(storage.get_item(NEWS_SLOT).await?, saved_before);

    Ok(())
}

#[tokio::test]
async fn test_failed_save_publishes_nothing_and_retry_publishes_once() -> Result<()> {
    let storage = Arc::new(FlakyStorage::default());
    let store = NewsStore::load(storage.clone()).await?;
    let moderator = RuleModerator::new("test".to_string()).with_delay(0);
    let mut pipeline = SubmissionPipeline::open(store, Box::new(moderator));
    let before = pipeline.stats().snapshot().clone();

    storage.fail_writes.store(true, Ordering::SeqCst);
    match pipeline.submit(festival_draft()).await {
        Err(NewsError::Database(_)) => {}
        other => panic!("expected storage failure, got {:?}", other),
    }

    assert_eq!(pipeline.store().news().len(), 4);
    assert_eq!(pipeline.stats().total_posts(), 4);
    assert_eq!(pipeline.stats().snapshot(), &before);
    assert!(!pipeline.ensure_stats_consistent());

    // Once storage recovers the same draft goes out exactly once
    storage.fail_writes.store(false, Ordering::SeqCst);
    assert!(pipeline.submit(festival_draft()).await?.is_published());
    assert_eq!(pipeline.store().news().len(), 5);
    assert_eq!(pipeline.stats().total_posts(), 5);

    let saved = storage.get_item(NEWS_SLOT).await?.expect("news slot written");
    let saved: Vec<NewsItem> = serde_json::from_str(&saved)?;
    assert_eq!(saved.len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_inconsistent_stats_are_reinitialized() -> Result<()> {
    let mut pipeline = open_pipeline(Arc::new(MemorySlotStorage::new())).await?;
    pipeline.submit(festival_draft()).await?;
    let expected = pipeline.stats().snapshot().clone();

    assert!(!pipeline.ensure_stats_consistent());

    pipeline.stats_mut().reset();
    assert_eq!(pipeline.stats().total_posts(), 0);

    assert!(pipeline.ensure_stats_consistent());
    assert_eq!(pipeline.stats().total_posts(), 5);
    // Replay happens in collection order (newest first), so only ties may
    // rank differently; every count must match
    let rebuilt = pipeline.stats().snapshot();
    for topic in ["festival", "accident", "community event", "local news"] {
        assert_eq!(rebuilt.topic_counts.get(topic), expected.topic_counts.get(topic));
    }
    for city in ["downtown", "mumbai", "delhi"] {
        assert_eq!(rebuilt.city_counts.get(city), expected.city_counts.get(city));
    }

    // An explicit rebuild over the same collection is deterministic
    let snapshot = pipeline.stats().snapshot().clone();
    pipeline.reinitialize_stats();
    assert_eq!(pipeline.stats().snapshot(), &snapshot);

    Ok(())
}

#[tokio::test]
async fn test_reopening_replays_persisted_news() -> Result<()> {
    let storage = Arc::new(MemorySlotStorage::new());
    {
        let mut pipeline = open_pipeline(storage.clone()).await?;
        pipeline.submit(festival_draft()).await?;
        pipeline.store_mut().toggle_bookmark("2").await?;
    }

    let pipeline = open_pipeline(storage).await?;
    assert!(!pipeline.store().was_seeded());
    assert_eq!(pipeline.stats().total_posts(), 5);
    assert_eq!(pipeline.stats().top_topics(1), pairs(&[("festival", 2)]));

    let analytics = pipeline.analytics();
    assert_eq!(analytics.total_news, 5);
    assert_eq!(analytics.total_bookmarks, 1);

    let summary = pipeline.stats_summary(2);
    assert_eq!(summary.total_posts, 5);
    assert_eq!(summary.top_publishers.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_shared_pipeline_serializes_submissions() -> Result<()> {
    let pipeline = Arc::new(Mutex::new(
        open_pipeline(Arc::new(MemorySlotStorage::new())).await?,
    ));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            pipeline.lock().await.submit(festival_draft()).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.expect("submit task panicked")?;
        assert!(outcome.is_published());
    }

    let pipeline = pipeline.lock().await;
    assert_eq!(pipeline.store().news().len(), 7);
    assert_eq!(pipeline.stats().total_posts(), 7);
    assert!(!pipeline.stats().top_cities(1).is_empty());

    Ok(())
}
