//! Integration tests for the periodic overdue sweeper.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use skill_loop_core::journey::{EmployeeCategory, PhaseStatus, PhaseType};
use skill_loop_core::phase_config::PhaseTemplate;
use skill_loop_core::types::DbId;
use skill_loop_db::models::user::CreateUser;
use skill_loop_db::repositories::{PhaseRepo, UserRepo};
use skill_loop_events::EventBus;
use skill_loop_journey::{InitializeJourney, JourneyEngine};
use skill_loop_worker::overdue_sweeper::OverdueSweeper;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Create an engine plus a two-phase journey that started in 2024, so its
/// first phase is already past due.
async fn setup(pool: &PgPool) -> (Arc<JourneyEngine>, DbId) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: "sweep@example.com".to_string(),
            display_name: "Sweep".to_string(),
            role: None,
        },
    )
    .await
    .unwrap();

    let engine = Arc::new(JourneyEngine::new(pool.clone(), Arc::new(EventBus::default())));
    let template = |title: &str| PhaseTemplate {
        phase_type: PhaseType::Training,
        title: title.to_string(),
        description: None,
        duration_days: 3,
        mentor_id: None,
    };
    let journey_id = engine
        .initialize_journey(
            InitializeJourney::new(user.id, EmployeeCategory::NewHire)
                .with_phases(vec![template("First"), template("Second")])
                .with_start_date(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
        )
        .await
        .unwrap();
    (engine, journey_id)
}

async fn first_phase_status(pool: &PgPool, journey_id: DbId) -> PhaseStatus {
    let phases = PhaseRepo::list_by_journey(pool, journey_id).await.unwrap();
    phases[0].status().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sweep_once_marks_past_due_phase(pool: PgPool) {
    let (engine, journey_id) = setup(&pool).await;
    let sweeper = OverdueSweeper::new(engine, Duration::from_secs(3600), true);

    assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
    assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
    assert_eq!(first_phase_status(&pool, journey_id).await, PhaseStatus::Overdue);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_sweeps_on_start_until_cancelled(pool: PgPool) {
    let (engine, journey_id) = setup(&pool).await;
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(
        OverdueSweeper::new(engine, Duration::from_secs(3600), true).run(cancel.clone()),
    );

    let mut status = PhaseStatus::InProgress;
    for _ in 0..50 {
        status = first_phase_status(&pool, journey_id).await;
        if status == PhaseStatus::Overdue {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, PhaseStatus::Overdue);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("sweeper did not stop")
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_waits_a_full_interval_when_not_sweeping_on_start(pool: PgPool) {
    let (engine, journey_id) = setup(&pool).await;
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(
        OverdueSweeper::new(engine, Duration::from_secs(3600), false).run(cancel.clone()),
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(first_phase_status(&pool, journey_id).await, PhaseStatus::InProgress);
}
