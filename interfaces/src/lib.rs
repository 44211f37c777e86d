pub mod defs;

pub use defs::{
    ModerationResult, NewsFilters, NewsItem, RejectionKind, SubmissionDraft, APPROVAL_REASON,
    KNOWN_TOPICS,
};
