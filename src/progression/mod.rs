pub mod achievements;
pub mod aggregator;
pub mod level;

use thiserror::Error;

pub use achievements::{
    check_achievements, Achievement, AchievementCondition, UserStatsSnapshot, ACHIEVEMENTS,
};
pub use aggregator::{
    apply_story_completion, CompletionEvent, CompletionOutcome, CompletionSummary, UserProgress,
    VocabularyEntry, WeeklyStats,
};
pub use level::{calculate_level, LevelInfo};

/// Progression state is cumulative and user-visible, so invalid values are
/// rejected up front instead of being coerced into the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressionError {
    #[error("experience total cannot be negative (got {0})")]
    NegativeXp(i64),
    #[error("invalid completion event: {0}")]
    InvalidEvent(String),
}
