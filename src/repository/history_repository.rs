use sqlx::{query, query_as, query_scalar, FromRow, Pool, Sqlite};
use tracing::debug;

use crate::{
    models::{types::EpochMillis, HistorySummary, PublishRecord, Submission},
    repository::conversion::DBConvertible,
};

use super::conversion::{DBFromConversionError, DBToConversionError};

/// Number of records kept; older ones are evicted on append.
pub const HISTORY_LIMIT: i64 = 100;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: Pool<Sqlite>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Sqlite>) -> HistoryRepository {
        HistoryRepository { pool }
    }

    /// Inserts the record as the newest entry and evicts everything past the limit.
    pub async fn append(&self, record: &PublishRecord) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let row = record.to_db()?;
        query(
            r#"
                INSERT INTO publish_history (
                    platform, title, language, code, url, detected_at,
                    difficulty, contest_id, problem_index, division,
                    remote_url, published_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&row.platform)
        .bind(&row.title)
        .bind(&row.language)
        .bind(&row.code)
        .bind(&row.url)
        .bind(row.detected_at)
        .bind(&row.difficulty)
        .bind(&row.contest_id)
        .bind(&row.problem_index)
        .bind(&row.division)
        .bind(&row.remote_url)
        .bind(row.published_at)
        .execute(&mut *transaction)
        .await?;

        let evicted = query(
            r#"
                DELETE FROM publish_history
                WHERE id NOT IN (
                    SELECT id FROM publish_history ORDER BY id DESC LIMIT $1
                )
            "#,
        )
        .bind(HISTORY_LIMIT)
        .execute(&mut *transaction)
        .await?
        .rows_affected();

        transaction.commit().await?;

        if evicted > 0 {
            debug!("Evicted {evicted} old history record(s)");
        }

        Ok(())
    }

    /// Newest first.
    pub async fn list(&self, limit: u32) -> Result<Vec<PublishRecord>, anyhow::Error> {
        let rows = query_as::<_, SqlPublishRecord>(
            r#"
                SELECT
                    platform, title, language, code, url, detected_at,
                    difficulty, contest_id, problem_index, division,
                    remote_url, published_at
                FROM publish_history
                ORDER BY id DESC
                LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| PublishRecord::from_db(row).map_err(anyhow::Error::from))
            .collect()
    }

    pub async fn clear(&self) -> Result<u64, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let deleted = query("DELETE FROM publish_history")
            .execute(&mut *transaction)
            .await?
            .rows_affected();

        transaction.commit().await?;

        Ok(deleted)
    }

    pub async fn summary(&self, now: EpochMillis) -> Result<HistorySummary, anyhow::Error> {
        let start_of_day = now.0 - now.0.rem_euclid(DAY_MILLIS);

        let total: i64 = query_scalar("SELECT COUNT(*) FROM publish_history")
            .fetch_one(&self.pool)
            .await?;

        let today: i64 =
            query_scalar("SELECT COUNT(*) FROM publish_history WHERE published_at >= $1")
                .bind(start_of_day)
                .fetch_one(&self.pool)
                .await?;

        let last: Option<i64> =
            query_scalar("SELECT published_at FROM publish_history ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(HistorySummary {
            total: total as u64,
            today: today as u64,
            last_published_at: last.map(EpochMillis),
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlPublishRecord {
    platform: String,
    title: String,
    language: String,
    code: String,
    url: String,
    detected_at: i64,
    difficulty: Option<String>,
    contest_id: Option<String>,
    problem_index: Option<String>,
    division: Option<String>,
    remote_url: String,
    published_at: i64,
}

impl DBConvertible for PublishRecord {
    type DBType = SqlPublishRecord;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let submission = &self.submission;

        Ok(SqlPublishRecord {
            platform: submission.platform.to_db()?,
            title: submission.title.clone(),
            language: submission.language.clone(),
            code: submission.code.clone(),
            url: submission.url.clone(),
            detected_at: submission.timestamp.to_db()?,
            difficulty: submission.difficulty.to_db()?,
            contest_id: submission.contest_id.clone(),
            problem_index: submission.problem_index.clone(),
            division: submission.division.clone(),
            remote_url: self.remote_url.clone(),
            published_at: self.published_at.to_db()?,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(PublishRecord {
            submission: Submission {
                platform: DBConvertible::from_db(&value.platform)?,
                title: value.title.clone(),
                language: value.language.clone(),
                code: value.code.clone(),
                url: value.url.clone(),
                timestamp: EpochMillis::from_db(&value.detected_at)?,
                difficulty: DBConvertible::from_db(&value.difficulty)?,
                contest_id: value.contest_id.clone(),
                problem_index: value.problem_index.clone(),
                division: value.division.clone(),
            },
            remote_url: value.remote_url.clone(),
            published_at: EpochMillis::from_db(&value.published_at)?,
        })
    }
}
