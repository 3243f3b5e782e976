//! Integration tests for delivery and route status tracking.
//!
//! Tests cover:
//! - Delivered flags per circuit stop
//! - Route lifecycle transitions and their rejections
//! - Daily reset and per-route reset
//! - Corrupt stored state and duration formatting

mod common;

use routeslips::core::status::{elapsed_millis, format_duration};
use time::macros::date;

use common::*;

#[tokio::test]
async fn test_delivery_state_defaults_to_false() -> anyhow::Result<()> {
    let store = memory_status_store();
    assert!(!store.get_delivery_state("KP2", 0).await?);

    store.set_delivery_state("KP2", 0, true).await?;
    store.set_delivery_state("KP2", 3, true).await?;
    assert!(store.get_delivery_state("KP2", 0).await?);
    assert!(!store.get_delivery_state("KP2", 1).await?);
    assert!(!store.get_delivery_state("KP20", 0).await?);

    store.set_delivery_state("KP2", 0, false).await?;
    assert!(!store.get_delivery_state("KP2", 0).await?);
    assert_eq!(store.delivered_count("KP2", 5).await?, 1);
    // Indices past the circuit length are not counted.
    assert_eq!(store.delivered_count("KP2", 3).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_circuit_status_is_default() -> anyhow::Result<()> {
    let store = memory_status_store();
    let status = store.get_circuit_status("NOPE").await?;
    assert_eq!(status, CircuitStatus::default());
    assert_eq!(status.status, RouteStatus::NotStarted);
    assert_eq!(status.start_time, None);
    assert_eq!(status.end_time, None);
    Ok(())
}

#[tokio::test]
async fn test_start_then_end_route() -> anyhow::Result<()> {
    let store = memory_status_store();

    let started = store.start_route("KP2", "08:00").await?;
    assert_eq!(started.status, RouteStatus::InProgress);
    assert_eq!(started.start_time.as_deref(), Some("08:00"));
    assert_eq!(started.end_time, None);
    assert_eq!(started.duration(), None);

    store.end_route("KP2", "10:30").await?;
    let status = store.get_circuit_status("KP2").await?;
    assert_eq!(status.status, RouteStatus::Completed);
    assert_eq!(status.start_time.as_deref(), Some("08:00"));
    assert_eq!(status.end_time.as_deref(), Some("10:30"));
    assert_eq!(status.duration().as_deref(), Some("2h 30min"));

    // Other circuits are untouched.
    assert_eq!(store.get_circuit_status("KP1").await?, CircuitStatus::default());
    Ok(())
}

#[tokio::test]
async fn test_end_without_start_is_rejected() -> anyhow::Result<()> {
    let store = memory_status_store();
    let result = store.end_route("KP2", "10:30").await;

    let err = result.expect_err("ending a not-started route should fail");
    assert_eq!(
        err.downcast_ref::<RouteError>(),
        Some(&RouteError::CannotEnd {
            code: "KP2".to_string(),
            status: RouteStatus::NotStarted,
        })
    );
    assert_eq!(store.get_circuit_status("KP2").await?, CircuitStatus::default());
    Ok(())
}

#[tokio::test]
async fn test_transitions_do_not_regress() -> anyhow::Result<()> {
    let store = memory_status_store();
    store.start_route("KP2", "08:00").await?;

    let restart = store.start_route("KP2", "09:00").await;
    assert!(matches!(
        restart.expect_err("second start should fail").downcast_ref::<RouteError>(),
        Some(RouteError::CannotStart { status: RouteStatus::InProgress, .. })
    ));

    store.end_route("KP2", "10:00").await?;
    assert!(store.start_route("KP2", "11:00").await.is_err());
    assert!(store.end_route("KP2", "11:00").await.is_err());

    let status = store.get_circuit_status("KP2").await?;
    assert_eq!(status.status, RouteStatus::Completed);
    assert_eq!(status.start_time.as_deref(), Some("08:00"));
    assert_eq!(status.end_time.as_deref(), Some("10:00"));
    Ok(())
}

#[tokio::test]
async fn test_reset_route_clears_only_that_circuit() -> anyhow::Result<()> {
    let store = memory_status_store();
    store.start_route("KP5", "08:00").await?;
    store.start_route("KP55", "08:05").await?;
    store.set_delivery_state("KP5", 0, true).await?;
    store.set_delivery_state("KP55", 0, true).await?;

    store.reset_route("KP5").await?;

    assert_eq!(store.get_circuit_status("KP5").await?, CircuitStatus::default());
    assert!(!store.get_delivery_state("KP5", 0).await?);
    assert_eq!(
        store.get_circuit_status("KP55").await?.status,
        RouteStatus::InProgress
    );
    assert!(store.get_delivery_state("KP55", 0).await?);

    // A reset route can be started again.
    store.start_route("KP5", "12:00").await?;
    Ok(())
}

#[tokio::test]
async fn test_daily_reset_applies_once_per_day() -> anyhow::Result<()> {
    let store = memory_status_store();

    // First run ever: no marker stored yet.
    assert!(store.check_and_apply_daily_reset(date!(2026 - 10 - 19)).await?);
    assert_eq!(store.last_reset_date().await?.as_deref(), Some("2026-10-19"));

    store.start_route("KP2", "08:00").await?;
    store.set_delivery_state("KP2", 1, true).await?;

    // Same day: nothing changes.
    assert!(!store.check_and_apply_daily_reset(date!(2026 - 10 - 19)).await?);
    assert_eq!(
        store.get_circuit_status("KP2").await?.status,
        RouteStatus::InProgress
    );
    assert!(store.get_delivery_state("KP2", 1).await?);

    // Next day: everything is cleared.
    assert!(store.check_and_apply_daily_reset(date!(2026 - 10 - 20)).await?);
    assert_eq!(store.get_circuit_status("KP2").await?, CircuitStatus::default());
    assert!(!store.get_delivery_state("KP2", 1).await?);
    assert_eq!(store.last_reset_date().await?.as_deref(), Some("2026-10-20"));

    assert!(!store.check_and_apply_daily_reset(date!(2026 - 10 - 20)).await?);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_state_reads_as_absent() -> anyhow::Result<()> {
    let kv = MemoryStore::new();
    kv.set("circuitStatus", "{not json".to_string()).await?;
    kv.set("deliveredAddresses", "[1, 2".to_string()).await?;
    let store = StatusStore::new(kv);

    assert_eq!(store.get_circuit_status("KP2").await?, CircuitStatus::default());
    assert!(!store.get_delivery_state("KP2", 0).await?);

    // Writing replaces the corrupt document.
    store.start_route("KP2", "08:00").await?;
    assert_eq!(
        store.get_circuit_status("KP2").await?.status,
        RouteStatus::InProgress
    );
    Ok(())
}

#[tokio::test]
async fn test_stored_document_format() -> anyhow::Result<()> {
    let store = memory_status_store();
    store.start_route("KP2", "2026-10-19T08:00:00+03:00").await?;
    store.set_delivery_state("KP2", 4, true).await?;

    let status_json = store.backend().get("circuitStatus").await?.expect("status stored");
    let value: serde_json::Value = serde_json::from_str(&status_json)?;
    assert_eq!(value["KP2"]["status"], "in-progress");
    assert_eq!(value["KP2"]["startTime"], "2026-10-19T08:00:00+03:00");
    assert!(value["KP2"]["endTime"].is_null());

    let delivered_json = store
        .backend()
        .get("deliveredAddresses")
        .await?
        .expect("delivered flags stored");
    let value: serde_json::Value = serde_json::from_str(&delivered_json)?;
    assert_eq!(value["KP2-4"], true);
    Ok(())
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0min");
    assert_eq!(format_duration(59_999), "0min");
    assert_eq!(format_duration(45 * 60_000 + 30_000), "45min");
    assert_eq!(format_duration(60 * 60_000), "1h 0min");
    assert_eq!(format_duration(150 * 60_000), "2h 30min");
}

#[test]
fn test_elapsed_between_timestamps() {
    assert_eq!(elapsed_millis("08:00", "10:30"), Some(150 * 60_000));
    assert_eq!(
        elapsed_millis("2026-10-19T08:00:00+03:00", "2026-10-19T06:15:00Z"),
        Some(75 * 60_000)
    );
    assert_eq!(elapsed_millis("08:00", "2026-10-19T06:15:00Z"), None);
    assert_eq!(elapsed_millis("soon", "10:30"), None);
}
