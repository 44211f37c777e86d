use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category labels offered by the submission form. Moderation and stats only
/// look at the string contents, so labels outside this list are accepted.
pub const KNOWN_TOPICS: &[&str] = &[
    "Accident",
    "Festival",
    "Community Event",
    "Local News",
    "City Update",
    "Town Event",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub title: String,
    pub description: String,
    pub city: String,
    pub topic: String,
    pub publisher_name: String,
    pub publisher_phone: String,
    // opaque attachment uri, never inspected
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Spam,
    Sensitive,
    TooShortOrIrrelevant,
}

impl RejectionKind {
    pub fn reason(&self) -> &'static str {
        match self {
            RejectionKind::Spam => "Content appears to be spam or off-topic. Please ensure your news relates to a local happening in your community.",
            RejectionKind::Sensitive => "Content contains potentially harmful or inappropriate material. Please review and resubmit with appropriate content.",
            RejectionKind::TooShortOrIrrelevant => "Content is too short or doesn't appear to be relevant local news. Please provide more details about a local happening.",
        }
    }
}

pub const APPROVAL_REASON: &str = "News is relevant to local community and contains appropriate content.";

/// Outcome of moderating a draft. Rejection is a normal result, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ModerationResult {
    Approved {
        edited_title: String,
        edited_summary: String,
        reason: String,
    },
    Rejected {
        kind: RejectionKind,
        reason: String,
    },
}

impl ModerationResult {
    pub fn rejected(kind: RejectionKind) -> Self {
        ModerationResult::Rejected {
            kind,
            reason: kind.reason().to_owned(),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ModerationResult::Approved { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            ModerationResult::Approved { reason, .. } | ModerationResult::Rejected { reason, .. } => reason,
        }
    }

    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            ModerationResult::Approved { .. } => None,
            ModerationResult::Rejected { kind, .. } => Some(*kind),
        }
    }
}

/// A published news item as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    // absent on seeded sample items, which never went through moderation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
    pub edited_title: String,
    pub edited_summary: String,
    pub city: String,
    pub topic: String,
    pub publisher_first_name: String,
    pub publisher_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_reason: Option<String>,
}

/// Exact-match feed filters. An empty string means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsFilters {
    pub city: String,
    pub topic: String,
}

impl NewsFilters {
    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.topic.is_empty()
    }
}
