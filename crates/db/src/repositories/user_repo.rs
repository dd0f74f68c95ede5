//! Repository for the `users` table.
//!
//! Only the journey projection columns are written here, and only from
//! inside the transaction that changes the owning journey.

use sqlx::{PgConnection, PgExecutor};
use skill_loop_core::journey::{EmployeeCategory, JourneyStatus};
use skill_loop_core::roles::ROLE_EMPLOYEE;
use skill_loop_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for users queries.
const COLUMNS: &str = "id, email, display_name, role, employee_category, \
    journey_status, current_phase_id, created_at, updated_at";

/// Provides user lookups and journey projection updates.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateUser) -> Result<User, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (email, display_name, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(input.role.as_deref().unwrap_or(ROLE_EMPLOYEE))
            .fetch_one(executor)
            .await
    }

    /// Find a user by primary key.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Set the full journey projection after a journey is (re)initialised.
    pub async fn set_journey_projection(
        conn: &mut PgConnection,
        user_id: DbId,
        category: EmployeeCategory,
        status: JourneyStatus,
        current_phase_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET employee_category = $2, journey_status = $3, current_phase_id = $4
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(category.as_str())
        .bind(status.as_str())
        .bind(current_phase_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Mirror a journey status change onto the user.
    pub async fn set_journey_status(
        conn: &mut PgConnection,
        user_id: DbId,
        status: JourneyStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET journey_status = $2 WHERE id = $1")
            .bind(user_id)
            .bind(status.as_str())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Point the user at their active phase (or clear it).
    pub async fn set_current_phase(
        conn: &mut PgConnection,
        user_id: DbId,
        phase_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET current_phase_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(phase_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
