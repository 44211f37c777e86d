use crate::types::{ModerationResult, RejectionKind, Result, SubmissionDraft, APPROVAL_REASON};
use async_trait::async_trait;
use tracing::{debug, info};

/// Trait for editors that decide whether a draft can be published.
///
/// Implementations may call out to a remote model; callers only see the
/// decision or an opaque [`crate::NewsError::ValidationFailed`].
#[async_trait]
pub trait Moderator: Send + Sync {
    /// Get the name of this moderator
    fn moderator_name(&self) -> String;

    /// Decide on a draft, rewriting title and summary when it is approved
    async fn evaluate(&self, draft: &SubmissionDraft) -> Result<ModerationResult>;
}

pub const SPAM_KEYWORDS: &[&str] = &["buy now", "click here", "free money", "lottery", "viagra"];

pub const SENSITIVE_KEYWORDS: &[&str] = &["violence", "hate", "discrimination", "illegal"];

pub const LOCAL_KEYWORDS: &[&str] = &[
    "accident",
    "festival",
    "community event",
    "local",
    "city",
    "town",
];

/// Measured in Unicode scalar values, so an emoji counts as one character.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Keyword-rule moderator standing in for a remote AI editor
pub struct RuleModerator {
    name: String,
    response_delay_ms: u64,
}

impl RuleModerator {
    pub fn new(name: String) -> Self {
        Self {
            name,
            response_delay_ms: 2000, // Simulate editor round trip
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }

    async fn simulate_processing(&self) {
        if self.response_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.response_delay_ms)).await;
        }
    }

    /// The rule set itself, without the simulated latency.
    pub fn decide(draft: &SubmissionDraft) -> ModerationResult {
        let title = draft.title.to_lowercase();
        let description = draft.description.to_lowercase();
        let topic = draft.topic.to_lowercase();

        if mentions_any(SPAM_KEYWORDS, &[title.as_str(), description.as_str()]) {
            return ModerationResult::rejected(RejectionKind::Spam);
        }

        if mentions_any(SENSITIVE_KEYWORDS, &[title.as_str(), description.as_str()]) {
            return ModerationResult::rejected(RejectionKind::Sensitive);
        }

        let too_short = draft.description.chars().count() < MIN_DESCRIPTION_CHARS;
        let irrelevant = !mentions_any(LOCAL_KEYWORDS, &[title.as_str(), description.as_str(), topic.as_str()]);
        if too_short || irrelevant {
            return ModerationResult::rejected(RejectionKind::TooShortOrIrrelevant);
        }

        ModerationResult::Approved {
            edited_title: edited_title(&draft.title, &draft.topic),
            edited_summary: edited_summary(&draft.description),
            reason: APPROVAL_REASON.to_string(),
        }
    }
}

impl Default for RuleModerator {
    fn default() -> Self {
        Self::new("default".to_string())
    }
}

#[async_trait]
impl Moderator for RuleModerator {
    fn moderator_name(&self) -> String {
        format!("Rule Moderator ({})", self.name)
    }

    async fn evaluate(&self, draft: &SubmissionDraft) -> Result<ModerationResult> {
        self.simulate_processing().await;

        let result = Self::decide(draft);
        match &result {
            ModerationResult::Approved { edited_title, .. } => {
                info!("Approved draft as \"{}\"", edited_title);
            }
            ModerationResult::Rejected { kind, .. } => {
                info!("Rejected draft \"{}\": {:?}", draft.title, kind);
            }
        }

        Ok(result)
    }
}

fn mentions_any(keywords: &[&str], fields: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| fields.iter().any(|field| field.contains(keyword)))
}

/// Headline prefix chosen from the case-folded topic
pub fn title_prefix(topic: &str) -> &'static str {
    match topic.to_lowercase().as_str() {
        "festival" => "Community",
        "city" => "City",
        "town" => "Town",
        // accident, community event, local, and anything unknown
        _ => "Local",
    }
}

pub fn edited_title(title: &str, topic: &str) -> String {
    format!("{} {}", title_prefix(topic), title)
}

/// Keep the first two sentences, each re-terminated with a period.
pub fn edited_summary(description: &str) -> String {
    let sentences: Vec<&str> = description
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    debug!("Summarising description with {} sentences", sentences.len());

    if sentences.len() >= 2 {
        format!("{}. {}.", sentences[0], sentences[1])
    } else {
        format!("{}.", description.trim())
    }
}
