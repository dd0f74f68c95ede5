//! Integration tests for the journey schema's database-level guarantees.
//!
//! The engine enforces these invariants in code; the schema enforces them a
//! second time so that no write path can bypass them.

use chrono::{Duration, TimeZone, Utc};
use skill_loop_core::activity::ActivityType;
use skill_loop_core::journey::{EmployeeCategory, JourneyStatus, PhaseStatus, PhaseType};
use skill_loop_core::types::{DbId, Timestamp};
use skill_loop_db::models::activity::CreateActivity;
use skill_loop_db::models::journey::CreateJourney;
use skill_loop_db::models::phase::CreatePhase;
use skill_loop_db::models::user::CreateUser;
use skill_loop_db::repositories::{ActivityRepo, JourneyRepo, PhaseRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

async fn new_user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "Test User".to_string(),
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_journey(user_id: DbId) -> CreateJourney {
    CreateJourney {
        user_id,
        employee_category: EmployeeCategory::NewHire,
        status: JourneyStatus::InProgress,
        cycle_number: 1,
        started_at: start(),
    }
}

fn new_phase(number: i32, status: PhaseStatus) -> CreatePhase {
    CreatePhase {
        phase_number: number,
        phase_type: PhaseType::Training,
        title: format!("Phase {number}"),
        description: None,
        duration_days: 3,
        status,
        started_at: None,
        due_date: start() + Duration::days(3 * i64::from(number)),
        mentor_id: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_active_phase_is_rejected(pool: PgPool) {
    let user_id = new_user(&pool, "active@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let journey = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();

    PhaseRepo::create(&mut conn, journey.id, &new_phase(1, PhaseStatus::InProgress))
        .await
        .unwrap();
    let second =
        PhaseRepo::create(&mut conn, journey.id, &new_phase(2, PhaseStatus::Overdue)).await;

    assert!(second.is_err(), "two active phases must violate uq_journey_phases_one_active");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_phase_number_is_rejected(pool: PgPool) {
    let user_id = new_user(&pool, "dup@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let journey = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();

    PhaseRepo::create(&mut conn, journey.id, &new_phase(1, PhaseStatus::NotStarted))
        .await
        .unwrap();
    let dup = PhaseRepo::create(&mut conn, journey.id, &new_phase(1, PhaseStatus::NotStarted))
        .await;

    assert!(dup.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_open_journey_per_user(pool: PgPool) {
    let user_id = new_user(&pool, "open@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let first = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();

    assert!(JourneyRepo::create(&mut conn, &new_journey(user_id)).await.is_err());

    JourneyRepo::update_status(&mut conn, first.id, JourneyStatus::Completed, Some(start()))
        .await
        .unwrap();
    let second = JourneyRepo::create(&mut conn, &new_journey(user_id)).await;
    assert!(second.is_ok(), "a new journey may start once the previous one completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activities_are_immutable(pool: PgPool) {
    let user_id = new_user(&pool, "audit@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let journey = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();

    let activity = ActivityRepo::create(
        &mut conn,
        &CreateActivity::new(journey.id, ActivityType::JourneyStarted, "Journey started", start()),
    )
    .await
    .unwrap();

    let update = sqlx::query("UPDATE journey_activities SET title = 'edited' WHERE id = $1")
        .bind(activity.id)
        .execute(&pool)
        .await;
    assert!(update.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_overdue_only_touches_in_progress(pool: PgPool) {
    let user_id = new_user(&pool, "overdue@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let journey = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();
    let phase = PhaseRepo::create(&mut conn, journey.id, &new_phase(1, PhaseStatus::InProgress))
        .await
        .unwrap();

    assert!(PhaseRepo::mark_overdue(&mut conn, phase.id).await.unwrap());
    assert!(!PhaseRepo::mark_overdue(&mut conn, phase.id).await.unwrap());

    let reloaded = PhaseRepo::find_by_id(&pool, phase.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status().unwrap(), PhaseStatus::Overdue);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overdue_candidates_skip_paused_journeys(pool: PgPool) {
    let running_user = new_user(&pool, "running@example.com").await;
    let paused_user = new_user(&pool, "paused@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let running = JourneyRepo::create(&mut conn, &new_journey(running_user)).await.unwrap();
    let paused = JourneyRepo::create(&mut conn, &new_journey(paused_user)).await.unwrap();
    JourneyRepo::update_status(&mut conn, paused.id, JourneyStatus::Paused, None)
        .await
        .unwrap();

    let running_phase =
        PhaseRepo::create(&mut conn, running.id, &new_phase(1, PhaseStatus::InProgress))
            .await
            .unwrap();
    PhaseRepo::create(&mut conn, paused.id, &new_phase(1, PhaseStatus::InProgress))
        .await
        .unwrap();

    let now = start() + Duration::days(10);
    let candidates = PhaseRepo::list_overdue_candidates(&pool, now).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].phase_id, running_phase.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_details_keeps_due_date(pool: PgPool) {
    let user_id = new_user(&pool, "edit@example.com").await;
    let mut conn = pool.acquire().await.unwrap();
    let journey = JourneyRepo::create(&mut conn, &new_journey(user_id)).await.unwrap();
    let phase = PhaseRepo::create(&mut conn, journey.id, &new_phase(1, PhaseStatus::InProgress))
        .await
        .unwrap();

    let updated = PhaseRepo::update_details(
        &mut conn,
        phase.id,
        &skill_loop_db::models::phase::UpdatePhase {
            title: Some("Renamed".to_string()),
            description: None,
            duration_days: Some(10),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.duration_days, 10);
    assert_eq!(updated.due_date, phase.due_date);
}
