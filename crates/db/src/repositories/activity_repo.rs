//! Repository for the append-only `journey_activities` table.
//!
//! There is no update or delete: rows are removed only by the cascade from
//! their journey, and a trigger rejects updates.

use sqlx::{PgConnection, PgExecutor};
use skill_loop_core::types::{DbId, Timestamp};

use crate::models::activity::{CreateActivity, JourneyActivity};

/// Column list for journey_activities queries.
const COLUMNS: &str = "id, journey_id, phase_number, activity_type, title, description, \
    metadata, actor_user_id, created_at";

/// Provides append and read operations for journey activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append an activity, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateActivity,
    ) -> Result<JourneyActivity, sqlx::Error> {
        let query = format!(
            "INSERT INTO journey_activities
                (journey_id, phase_number, activity_type, title, description,
                 metadata, actor_user_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyActivity>(&query)
            .bind(input.journey_id)
            .bind(input.phase_number)
            .bind(input.activity_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.metadata)
            .bind(input.actor_user_id)
            .bind(input.created_at)
            .fetch_one(conn)
            .await
    }

    /// All activities of a journey in insertion order.
    pub async fn list_by_journey<'e, E>(
        executor: E,
        journey_id: DbId,
    ) -> Result<Vec<JourneyActivity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM journey_activities
             WHERE journey_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, JourneyActivity>(&query)
            .bind(journey_id)
            .fetch_all(executor)
            .await
    }

    /// Timestamp of the journey's most recent activity.
    pub async fn latest_created_at<'e, E>(
        executor: E,
        journey_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (Option<Timestamp>,) = sqlx::query_as(
            "SELECT MAX(created_at) FROM journey_activities WHERE journey_id = $1",
        )
        .bind(journey_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Count activities of one type for a journey.
    pub async fn count_by_type<'e, E>(
        executor: E,
        journey_id: DbId,
        activity_type: &str,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM journey_activities
             WHERE journey_id = $1 AND activity_type = $2",
        )
        .bind(journey_id)
        .bind(activity_type)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }
}
