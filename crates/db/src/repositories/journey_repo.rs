//! Repository for the `journeys` table.

use sqlx::{PgConnection, PgExecutor};
use skill_loop_core::journey::JourneyStatus;
use skill_loop_core::types::{DbId, Timestamp};

use crate::models::journey::{CreateJourney, Journey};

/// Column list for journeys queries.
const COLUMNS: &str = "id, user_id, employee_category, status, cycle_number, \
    started_at, completed_at, created_at, updated_at";

/// Provides CRUD operations for journeys.
pub struct JourneyRepo;

impl JourneyRepo {
    /// Insert a new journey, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateJourney,
    ) -> Result<Journey, sqlx::Error> {
        let query = format!(
            "INSERT INTO journeys (user_id, employee_category, status, cycle_number, started_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(input.user_id)
            .bind(input.employee_category.as_str())
            .bind(input.status.as_str())
            .bind(input.cycle_number)
            .bind(input.started_at)
            .fetch_one(conn)
            .await
    }

    /// Find a journey by its primary key.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Journey>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM journeys WHERE id = $1");
        sqlx::query_as::<_, Journey>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Load a journey and take a row lock on it for the rest of the
    /// transaction. All mutations of a journey aggregate start here.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Journey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM journeys WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Journey>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The user's journey that is not yet completed, if any.
    pub async fn find_open_for_user<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Option<Journey>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM journeys
             WHERE user_id = $1 AND status <> $2"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .bind(JourneyStatus::Completed.as_str())
            .fetch_optional(executor)
            .await
    }

    /// The user's most recently created journey.
    pub async fn find_latest_for_user<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Option<Journey>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM journeys
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// All journeys of a user, newest first.
    pub async fn list_for_user<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Vec<Journey>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM journeys
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Set a journey's status. `completed_at` is set for `completed` and
    /// cleared otherwise.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: JourneyStatus,
        completed_at: Option<Timestamp>,
    ) -> Result<Journey, sqlx::Error> {
        let query = format!(
            "UPDATE journeys SET status = $2, completed_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(completed_at)
            .fetch_one(conn)
            .await
    }
}
