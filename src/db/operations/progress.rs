use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::db::DatabaseProxy;
use crate::progression::{
    apply_story_completion, CompletionEvent, CompletionSummary, ProgressionError, UserProgress,
    VocabularyEntry,
};

#[derive(Debug, Error)]
pub enum ProgressStoreError {
    #[error("user not found")]
    UserNotFound,
    #[error("story not found")]
    StoryNotFound,
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error("stored progress record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub async fn story_exists(pool: &PgPool, story_id: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(r#"SELECT "id" FROM "stories" WHERE "id" = $1"#)
        .bind(story_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Progress and vocabulary for the profile surface. `None` when the user
/// does not exist; a user without a progress document gets a zeroed record.
pub async fn load_progress(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<(UserProgress, Vec<VocabularyEntry>)>, ProgressStoreError> {
    let row = sqlx::query(r#"SELECT "progress", "vocabulary" FROM "users" WHERE "id" = $1"#)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let progress = parse_progress(row.try_get("progress")?, Utc::now())?;
    let vocabulary = parse_vocabulary(row.try_get("vocabulary")?)?;
    Ok(Some((progress, vocabulary)))
}

/// Applies a completion event under the per-user write serialization the
/// aggregator's contract requires: the user row is locked for the duration
/// of the transaction, so two concurrent completions for the same user
/// serialize and both stories land in the record.
pub async fn complete_story(
    proxy: &DatabaseProxy,
    user_id: &str,
    event: &CompletionEvent,
    now: DateTime<Utc>,
) -> Result<CompletionSummary, ProgressStoreError> {
    let pool = proxy.pool();

    if !story_exists(pool, &event.story_id).await? {
        return Err(ProgressStoreError::StoryNotFound);
    }

    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r#"SELECT "progress", "vocabulary" FROM "users" WHERE "id" = $1 FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Err(ProgressStoreError::UserNotFound);
    };

    let progress = parse_progress(row.try_get("progress")?, now)?;
    let vocabulary = parse_vocabulary(row.try_get("vocabulary")?)?;
    let known_words: HashSet<String> = vocabulary.into_iter().map(|entry| entry.word).collect();

    let outcome = apply_story_completion(progress, &known_words, event, now)?;

    sqlx::query(
        r#"UPDATE "users"
           SET "progress" = $2,
               "vocabulary" = COALESCE("vocabulary", '[]'::jsonb) || $3,
               "updatedAt" = NOW()
           WHERE "id" = $1"#,
    )
    .bind(user_id)
    .bind(serde_json::to_value(&outcome.progress)?)
    .bind(serde_json::to_value(&outcome.new_vocabulary)?)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        user_id,
        story_id = %event.story_id,
        xp = outcome.summary.xp_earned,
        level = outcome.summary.new_level,
        achievements = outcome.summary.new_achievements.len(),
        "story completion applied"
    );

    Ok(outcome.summary)
}

fn parse_progress(
    raw: Option<serde_json::Value>,
    now: DateTime<Utc>,
) -> Result<UserProgress, serde_json::Error> {
    match raw {
        Some(value) if !value.is_null() => serde_json::from_value(value),
        _ => Ok(UserProgress::new(now.date_naive())),
    }
}

fn parse_vocabulary(
    raw: Option<serde_json::Value>,
) -> Result<Vec<VocabularyEntry>, serde_json::Error> {
    match raw {
        Some(value) if !value.is_null() => serde_json::from_value(value),
        _ => Ok(Vec::new()),
    }
}
