use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::operations::progress::load_progress;
use crate::db::DatabaseProxy;
use crate::progression::{
    calculate_level, AchievementCondition, LevelInfo, UserStatsSnapshot, WeeklyStats, ACHIEVEMENTS,
};
use crate::response::json_error;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
    level_info: LevelInfo,
    total_xp: i64,
    streak_days: i64,
    stories_completed: i64,
    words_learned: i64,
    daily_progress: i64,
    daily_goal: i64,
    weekly_stats: WeeklyStats,
    achievements: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AchievementStatus {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    emoji: &'static str,
    xp_reward: i64,
    condition: AchievementCondition,
    unlocked: bool,
    progress: i64,
}

/// GET /api/users/me/progress
///
/// Level and streak information for the profile page. The level is always
/// recomputed from the stored XP total, never read back from the record.
pub async fn progress(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (proxy, user) = match authenticate(&state, &headers).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    let record = match load_progress(proxy.pool(), &user.id).await {
        Ok(Some((record, _vocabulary))) => record,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "user not found")
                .into_response();
        }
        Err(err) => {
            tracing::warn!(error = %err, user_id = %user.id, "progress query failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "failed to load progress",
            )
            .into_response();
        }
    };

    let level_info = match calculate_level(record.total_xp) {
        Ok(info) => info,
        Err(err) => {
            tracing::error!(error = %err, user_id = %user.id, "stored XP total is invalid");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "progress record is invalid",
            )
            .into_response();
        }
    };

    Json(SuccessResponse {
        success: true,
        data: ProgressResponse {
            level_info,
            total_xp: record.total_xp,
            streak_days: record.streak_days,
            stories_completed: record.stories_completed.len() as i64,
            words_learned: record.words_learned,
            daily_progress: record.daily_progress,
            daily_goal: record.daily_goal,
            weekly_stats: record.weekly_stats,
            achievements: record.achievements,
        },
    })
    .into_response()
}

/// GET /api/achievements
///
/// Full catalog with per-user unlocked status and percent progress toward
/// each threshold.
pub async fn achievements(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (proxy, user) = match authenticate(&state, &headers).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    let record = match load_progress(proxy.pool(), &user.id).await {
        Ok(Some((record, _vocabulary))) => record,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "user not found")
                .into_response();
        }
        Err(err) => {
            tracing::warn!(error = %err, user_id = %user.id, "achievements query failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "failed to load achievements",
            )
            .into_response();
        }
    };

    let stats = UserStatsSnapshot {
        stories_completed: record.stories_completed.len() as i64,
        words_learned: record.words_learned,
        streak_days: record.streak_days,
        total_xp: record.total_xp,
    };

    let catalog: Vec<AchievementStatus> = ACHIEVEMENTS
        .iter()
        .map(|achievement| {
            let unlocked = record
                .achievements
                .iter()
                .any(|id| id == achievement.id);
            let progress = if unlocked {
                100
            } else {
                let current = achievement.condition.current_value(&stats);
                let target = achievement.condition.target().max(1);
                (current * 100 / target).min(100)
            };
            AchievementStatus {
                id: achievement.id,
                title: achievement.title,
                description: achievement.description,
                emoji: achievement.emoji,
                xp_reward: achievement.xp_reward,
                condition: achievement.condition,
                unlocked,
                progress,
            }
        })
        .collect();

    Json(SuccessResponse {
        success: true,
        data: catalog,
    })
    .into_response()
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(std::sync::Arc<DatabaseProxy>, crate::auth::AuthUser), Response> {
    let Some(token) = crate::auth::extract_token(headers) else {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "authentication token required",
        )
        .into_response());
    };

    let Some(proxy) = state.db_proxy() else {
        return Err(json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "database unavailable",
        )
        .into_response());
    };

    match crate::auth::verify_request_token(proxy.as_ref(), &token).await {
        Ok(user) => Ok((proxy, user)),
        Err(_) => Err(json_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "authentication failed",
        )
        .into_response()),
    }
}
