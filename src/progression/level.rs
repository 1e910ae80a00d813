use serde::Serialize;

use super::ProgressionError;

pub const BASE_XP: i64 = 100;
pub const MULTIPLIER: f64 = 1.5;
pub const MAX_LEVEL: i64 = 50;

/// Derived view of a cumulative XP total. Never persisted on its own;
/// recomputed from the total every time it is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: i64,
    pub current_xp: i64,
    pub xp_for_this_level: i64,
    pub xp_for_next_level: i64,
    pub progress_percent: i64,
    pub title: &'static str,
    pub description: &'static str,
}

/// Walks the geometric level thresholds upward until `total_xp` falls below
/// the next one or the level cap is reached. The threshold boundary is
/// inclusive: exactly 100 XP is level 2.
pub fn calculate_level(total_xp: i64) -> Result<LevelInfo, ProgressionError> {
    if total_xp < 0 {
        return Err(ProgressionError::NegativeXp(total_xp));
    }

    let mut level: i64 = 1;
    let mut xp_for_this_level: i64 = 0;
    let mut xp_for_next_level: i64 = BASE_XP;

    while total_xp >= xp_for_next_level && level < MAX_LEVEL {
        level += 1;
        xp_for_this_level = xp_for_next_level;
        xp_for_next_level = (BASE_XP as f64 * MULTIPLIER.powi(level as i32 - 1)).floor() as i64;
    }

    let current_xp = total_xp - xp_for_this_level;
    let xp_needed = xp_for_next_level - xp_for_this_level;
    let progress_percent = if level == MAX_LEVEL {
        100
    } else {
        ((current_xp as f64 / xp_needed as f64) * 100.0).floor() as i64
    };

    Ok(LevelInfo {
        level,
        current_xp,
        xp_for_this_level,
        xp_for_next_level,
        progress_percent,
        title: level_title(level),
        description: level_description(level),
    })
}

pub fn level_title(level: i64) -> &'static str {
    match level {
        l if l >= 40 => "Polyglot Master",
        l if l >= 35 => "Language Virtuoso",
        l if l >= 30 => "Fluency Expert",
        l if l >= 25 => "Advanced Speaker",
        l if l >= 20 => "Conversation Pro",
        l if l >= 15 => "Language Explorer",
        l if l >= 10 => "Word Collector",
        l if l >= 5 => "Rising Linguist",
        _ => "Language Beginner",
    }
}

pub fn level_description(level: i64) -> &'static str {
    match level {
        l if l >= 40 => "You've mastered the art of language learning!",
        l if l >= 35 => "You're approaching native-level fluency!",
        l if l >= 30 => "You can handle complex conversations with ease!",
        l if l >= 25 => "You're comfortable in most language situations!",
        l if l >= 20 => "You can engage in meaningful conversations!",
        l if l >= 15 => "You're exploring advanced language concepts!",
        l if l >= 10 => "You're building a solid vocabulary foundation!",
        l if l >= 5 => "You're making great progress in your language journey!",
        _ => "Welcome to your language learning adventure!",
    }
}

/// XP-granting actions across the product, with their base rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpAction {
    StoryScene,
    StoryComplete,
    PerfectStory,
    QuizCorrect,
    QuizPerfect,
    NewWord,
    WordMastery,
    DailyLogin,
    WeeklyStreak,
    MonthlyStreak,
    FirstStory,
    TenthStory,
    HundredthWord,
    PerfectWeek,
}

impl XpAction {
    pub fn base_xp(self) -> i64 {
        match self {
            Self::StoryScene => 10,
            Self::StoryComplete => 50,
            Self::PerfectStory => 25,
            Self::QuizCorrect => 5,
            Self::QuizPerfect => 20,
            Self::NewWord => 3,
            Self::WordMastery => 15,
            Self::DailyLogin => 10,
            Self::WeeklyStreak => 50,
            Self::MonthlyStreak => 200,
            Self::FirstStory => 30,
            Self::TenthStory => 100,
            Self::HundredthWord => 75,
            Self::PerfectWeek => 150,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RewardModifiers {
    /// Current streak length; each day past the first adds 10%.
    pub streak: Option<i64>,
    /// Accuracy in [0, 1], applied as a direct factor.
    pub accuracy: Option<f64>,
    /// Difficulty level, scaled as 0.5 + 0.3 * difficulty.
    pub difficulty: Option<f64>,
}

/// Base reward scaled by the session modifiers, floored at each step,
/// never below 1 XP.
pub fn scaled_xp_reward(action: XpAction, modifiers: RewardModifiers) -> i64 {
    let mut xp = action.base_xp();

    if let Some(streak) = modifiers.streak {
        xp = (xp as f64 * (1.0 + (streak - 1) as f64 * 0.1)).floor() as i64;
    }

    if let Some(accuracy) = modifiers.accuracy {
        xp = (xp as f64 * accuracy).floor() as i64;
    }

    if let Some(difficulty) = modifiers.difficulty {
        xp = (xp as f64 * (0.5 + difficulty * 0.3)).floor() as i64;
    }

    xp.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_xp_is_level_one() {
        let info = calculate_level(0).unwrap();
        assert_eq!(info.level, 1);
        assert_eq!(info.current_xp, 0);
        assert_eq!(info.progress_percent, 0);
        assert_eq!(info.title, "Language Beginner");
    }

    #[test]
    fn test_level_two_boundary_is_inclusive() {
        let below = calculate_level(99).unwrap();
        assert_eq!(below.level, 1);
        assert_eq!(below.progress_percent, 99);

        let at = calculate_level(100).unwrap();
        assert_eq!(at.level, 2);
        assert_eq!(at.current_xp, 0);
        assert_eq!(at.xp_for_this_level, 100);
    }

    #[test]
    fn test_threshold_invariant_below_cap() {
        for xp in [0, 1, 99, 100, 149, 150, 500, 10_000] {
            let info = calculate_level(xp).unwrap();
            if info.level < MAX_LEVEL {
                assert!(info.xp_for_this_level <= xp, "xp={xp}");
                assert!(xp < info.xp_for_next_level, "xp={xp}");
            }
        }
    }

    #[test]
    fn test_max_level_cap() {
        let info = calculate_level(i64::MAX / 2).unwrap();
        assert_eq!(info.level, MAX_LEVEL);
        assert_eq!(info.progress_percent, 100);
    }

    #[test]
    fn test_negative_xp_rejected() {
        assert_eq!(calculate_level(-1), Err(ProgressionError::NegativeXp(-1)));
    }

    #[test]
    fn test_titles_by_tier() {
        assert_eq!(level_title(4), "Language Beginner");
        assert_eq!(level_title(5), "Rising Linguist");
        assert_eq!(level_title(19), "Language Explorer");
        assert_eq!(level_title(40), "Polyglot Master");
        assert_eq!(level_title(50), "Polyglot Master");
    }

    #[test]
    fn test_scaled_reward_streak_bonus() {
        // 7-day streak: 10 * (1 + 6 * 0.1) = 16
        let xp = scaled_xp_reward(
            XpAction::StoryScene,
            RewardModifiers {
                streak: Some(7),
                ..Default::default()
            },
        );
        assert_eq!(xp, 16);
    }

    #[test]
    fn test_scaled_reward_floors_at_one() {
        let xp = scaled_xp_reward(
            XpAction::NewWord,
            RewardModifiers {
                accuracy: Some(0.0),
                ..Default::default()
            },
        );
        assert_eq!(xp, 1);
    }
}
