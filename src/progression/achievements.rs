use serde::Serialize;

/// Threshold an achievement is gated on. Kept as plain data rather than a
/// predicate so the catalog stays serializable and evaluable in one place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AchievementCondition {
    StoriesCompleted { min: i64 },
    WordsLearned { min: i64 },
    StreakDays { min: i64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub xp_reward: i64,
    pub condition: AchievementCondition,
}

/// Snapshot of user statistics at evaluation time, assembled by the
/// aggregator after the completion event has been merged in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserStatsSnapshot {
    pub stories_completed: i64,
    pub words_learned: i64,
    pub streak_days: i64,
    pub total_xp: i64,
}

pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_story",
        title: "First Steps",
        description: "Complete your first story",
        emoji: "\u{1F3AF}",
        xp_reward: 30,
        condition: AchievementCondition::StoriesCompleted { min: 1 },
    },
    Achievement {
        id: "story_master",
        title: "Story Master",
        description: "Complete 10 stories",
        emoji: "\u{1F4DA}",
        xp_reward: 100,
        condition: AchievementCondition::StoriesCompleted { min: 10 },
    },
    Achievement {
        id: "word_collector",
        title: "Word Collector",
        description: "Learn 100 new words",
        emoji: "\u{1F4D6}",
        xp_reward: 75,
        condition: AchievementCondition::WordsLearned { min: 100 },
    },
    Achievement {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Maintain a 7-day learning streak",
        emoji: "\u{1F525}",
        xp_reward: 50,
        condition: AchievementCondition::StreakDays { min: 7 },
    },
    Achievement {
        id: "month_master",
        title: "Month Master",
        description: "Maintain a 30-day learning streak",
        emoji: "\u{1F451}",
        xp_reward: 200,
        condition: AchievementCondition::StreakDays { min: 30 },
    },
];

impl AchievementCondition {
    pub fn is_met(&self, stats: &UserStatsSnapshot) -> bool {
        self.current_value(stats) >= self.target()
    }

    pub fn current_value(&self, stats: &UserStatsSnapshot) -> i64 {
        match self {
            Self::StoriesCompleted { .. } => stats.stories_completed,
            Self::WordsLearned { .. } => stats.words_learned,
            Self::StreakDays { .. } => stats.streak_days,
        }
    }

    pub fn target(&self) -> i64 {
        match self {
            Self::StoriesCompleted { min }
            | Self::WordsLearned { min }
            | Self::StreakDays { min } => *min,
        }
    }
}

pub fn find_achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Returns the achievements newly qualifying for `stats`, in catalog order.
/// Evaluating the whole catalog fresh means a stat that jumps past two
/// thresholds in one update unlocks both in the same pass.
pub fn check_achievements(
    stats: &UserStatsSnapshot,
    already_earned: &[String],
) -> Vec<&'static Achievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|achievement| {
            !already_earned.iter().any(|id| id == achievement.id)
                && achievement.condition.is_met(stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(stories: i64, words: i64, streak: i64) -> UserStatsSnapshot {
        UserStatsSnapshot {
            stories_completed: stories,
            words_learned: words,
            streak_days: streak,
            total_xp: 0,
        }
    }

    #[test]
    fn test_fresh_user_earns_nothing() {
        assert!(check_achievements(&stats(0, 0, 0), &[]).is_empty());
    }

    #[test]
    fn test_first_story_unlocks() {
        let earned = check_achievements(&stats(1, 0, 0), &[]);
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, "first_story");
        assert_eq!(earned[0].xp_reward, 30);
    }

    #[test]
    fn test_already_earned_is_skipped() {
        let earned = check_achievements(&stats(1, 0, 0), &["first_story".to_string()]);
        assert!(earned.is_empty());
    }

    #[test]
    fn test_bulk_jump_unlocks_both_tiers() {
        // 10 stories qualifies for both story achievements in one pass.
        let earned = check_achievements(&stats(10, 0, 0), &[]);
        let ids: Vec<&str> = earned.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_story", "story_master"]);
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let earned = check_achievements(&stats(10, 100, 30), &[]);
        let ids: Vec<&str> = earned.iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec![
                "first_story",
                "story_master",
                "word_collector",
                "week_warrior",
                "month_master"
            ]
        );
    }

    #[test]
    fn test_week_warrior_threshold() {
        assert!(check_achievements(&stats(0, 0, 6), &[]).is_empty());
        let earned = check_achievements(&stats(0, 0, 7), &[]);
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, "week_warrior");
        assert_eq!(earned[0].xp_reward, 50);
    }

    #[test]
    fn test_find_achievement_by_id() {
        assert_eq!(find_achievement("week_warrior").map(|a| a.xp_reward), Some(50));
        assert!(find_achievement("no_such_badge").is_none());
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in ACHIEVEMENTS.iter().enumerate() {
            for b in &ACHIEVEMENTS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
