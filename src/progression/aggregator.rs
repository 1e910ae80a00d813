use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::achievements::{check_achievements, Achievement, UserStatsSnapshot};
use super::level::{calculate_level, LevelInfo};
use super::ProgressionError;

pub const DEFAULT_DAILY_GOAL: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyStats {
    pub stories_completed: i64,
    pub words_learned: i64,
    pub xp_earned: i64,
    pub start_date: NaiveDate,
}

impl Default for WeeklyStats {
    fn default() -> Self {
        Self {
            stories_completed: 0,
            words_learned: 0,
            xp_earned: 0,
            start_date: NaiveDate::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub word: String,
    pub translation: String,
    pub mastery_level: i64,
    pub times_encountered: i64,
    pub needs_review: bool,
    pub last_reviewed: DateTime<Utc>,
}

/// Persisted per-user progress record. The vectors carry set semantics:
/// merges are membership-checked, so replayed completions never accumulate
/// duplicates. `current_level` is stored for fast reads but `total_xp` is
/// the source of truth; the aggregator recomputes the level on every entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub scenes_completed: Vec<String>,
    pub stories_completed: Vec<String>,
    pub words_learned: i64,
    pub total_xp: i64,
    pub current_level: i64,
    pub streak_days: i64,
    pub last_login_date: NaiveDate,
    pub achievements: Vec<String>,
    pub daily_goal: i64,
    pub daily_progress: i64,
    pub weekly_stats: WeeklyStats,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            scenes_completed: Vec::new(),
            stories_completed: Vec::new(),
            words_learned: 0,
            total_xp: 0,
            current_level: 1,
            streak_days: 0,
            last_login_date: NaiveDate::default(),
            achievements: Vec::new(),
            daily_goal: DEFAULT_DAILY_GOAL,
            daily_progress: 0,
            weekly_stats: WeeklyStats::default(),
        }
    }
}

impl UserProgress {
    /// Zeroed record for a fresh registration or a target-language switch.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            last_login_date: today,
            weekly_stats: WeeklyStats {
                start_date: today,
                ..WeeklyStats::default()
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub story_id: String,
    pub xp_earned: i64,
    #[serde(default)]
    pub words_learned: Vec<String>,
    #[serde(default)]
    pub scenes_completed: Vec<String>,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub time_spent: i64,
    #[serde(default)]
    pub mistakes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub xp_reward: i64,
}

impl From<&'static Achievement> for UnlockedAchievement {
    fn from(achievement: &'static Achievement) -> Self {
        Self {
            id: achievement.id,
            title: achievement.title,
            description: achievement.description,
            emoji: achievement.emoji,
            xp_reward: achievement.xp_reward,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    /// Total XP awarded by this call, achievement bonuses included.
    pub xp_earned: i64,
    pub new_level: i64,
    pub leveled_up: bool,
    pub new_achievements: Vec<UnlockedAchievement>,
    pub level_info: LevelInfo,
    pub streak_days: i64,
    pub total_stories_completed: i64,
    pub total_words_learned: i64,
    pub daily_progress: i64,
    pub daily_goal: i64,
}

#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub progress: UserProgress,
    /// Entries to append to the user's vocabulary list; words already known
    /// or repeated within the event are filtered out.
    pub new_vocabulary: Vec<VocabularyEntry>,
    pub summary: CompletionSummary,
}

/// Applies a story-completion event to a progress record.
///
/// Pure with respect to its inputs: the caller loads the record, passes the
/// current instant, and persists the returned record. Serializing concurrent
/// calls for the same user is the persistence layer's job; the merge here is
/// idempotent for replayed story/scene ids but cannot repair a lost update.
pub fn apply_story_completion(
    mut progress: UserProgress,
    known_words: &HashSet<String>,
    event: &CompletionEvent,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome, ProgressionError> {
    if event.story_id.trim().is_empty() {
        return Err(ProgressionError::InvalidEvent(
            "storyId must not be empty".to_string(),
        ));
    }
    if event.xp_earned < 0 {
        return Err(ProgressionError::InvalidEvent(format!(
            "xpEarned must be non-negative (got {})",
            event.xp_earned
        )));
    }

    // The stored level is derived data and may be stale; recompute it from
    // the XP total before using it for level-up detection.
    let entry_level = calculate_level(progress.total_xp)?.level;

    let already_completed = progress
        .stories_completed
        .iter()
        .any(|id| id == &event.story_id);
    if !already_completed {
        progress.stories_completed.push(event.story_id.clone());
    }
    for scene_id in &event.scenes_completed {
        if !progress.scenes_completed.iter().any(|s| s == scene_id) {
            progress.scenes_completed.push(scene_id.clone());
        }
    }

    progress.total_xp += event.xp_earned;
    let base_level = calculate_level(progress.total_xp)?;
    let mut leveled_up = base_level.level > entry_level;
    progress.current_level = base_level.level;

    let mut new_vocabulary: Vec<VocabularyEntry> = Vec::new();
    let mut seen_this_event: HashSet<&str> = HashSet::new();
    for word in &event.words_learned {
        let word = word.trim();
        if word.is_empty() || known_words.contains(word) || !seen_this_event.insert(word) {
            continue;
        }
        new_vocabulary.push(VocabularyEntry {
            word: word.to_string(),
            translation: String::new(),
            mastery_level: 0,
            times_encountered: 1,
            needs_review: false,
            last_reviewed: now,
        });
    }
    let new_word_count = new_vocabulary.len() as i64;
    progress.words_learned += new_word_count;

    progress.daily_progress += event.xp_earned;
    progress.weekly_stats.xp_earned += event.xp_earned;
    if !already_completed {
        progress.weekly_stats.stories_completed += 1;
    }
    progress.weekly_stats.words_learned += new_word_count;

    // Streaks are counted on UTC login days, not instants. A same-day
    // completion (or a clock running backwards) leaves the streak alone.
    let today = now.date_naive();
    let days_diff = (today - progress.last_login_date).num_days();
    if days_diff == 1 {
        progress.streak_days += 1;
    } else if days_diff > 1 {
        progress.streak_days = 1;
    }
    progress.last_login_date = today;

    let stats = UserStatsSnapshot {
        stories_completed: progress.stories_completed.len() as i64,
        words_learned: progress.words_learned,
        streak_days: progress.streak_days,
        total_xp: progress.total_xp,
    };
    let unlocked = check_achievements(&stats, &progress.achievements);
    let mut bonus_xp = 0;
    for achievement in &unlocked {
        progress.achievements.push(achievement.id.to_string());
        bonus_xp += achievement.xp_reward;
    }

    // Second level pass: achievement bonuses count toward the final level,
    // so a bonus can flip leveled_up even when the base XP did not.
    progress.total_xp += bonus_xp;
    let final_level = calculate_level(progress.total_xp)?;
    leveled_up = leveled_up || final_level.level > progress.current_level;
    progress.current_level = final_level.level;

    let summary = CompletionSummary {
        xp_earned: event.xp_earned + bonus_xp,
        new_level: final_level.level,
        leveled_up,
        new_achievements: unlocked.into_iter().map(UnlockedAchievement::from).collect(),
        streak_days: progress.streak_days,
        total_stories_completed: progress.stories_completed.len() as i64,
        total_words_learned: progress.words_learned,
        daily_progress: progress.daily_progress,
        daily_goal: progress.daily_goal,
        level_info: final_level,
    };

    Ok(CompletionOutcome {
        progress,
        new_vocabulary,
        summary,
    })
}
