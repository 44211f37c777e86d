pub mod types;
pub mod traits;
pub mod moderation;
pub mod aggregators;
pub mod storage;
pub mod store;
pub mod pipeline;
pub mod validation;
pub mod utils;

pub use types::*;
pub use traits::SlotStorage;
pub use moderation::{Moderator, RuleModerator};
pub use aggregators::{AggregateStats, StatsAggregator, StatsSummary, DEFAULT_TOP_LIMIT};
pub use storage::{MemorySlotStorage, SqliteSlotStorage};
pub use store::{NewsStore, StoreAnalytics};
pub use pipeline::SubmissionPipeline;
pub use validation::{validate_draft, DraftField, FormErrors};
