//! End-to-end session scenarios.
//!
//! The first group drives `SessionController` directly; the second runs the
//! same stories through `SessionRuntime` on paused tokio time so that hold
//! intervals and subscriptions are exercised too.

use std::time::Duration;

use focusforest_core::{
    ChannelVisibility, Event, ManualClock, RuntimeOptions, SessionController, SessionRuntime,
    SessionSettings, SessionStatus, VisibilityPolicy, WarningChoice,
};

/// Everything buffered so far, minus the per-change state snapshots.
fn drain_transitions(events: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if !matches!(event, Event::StateSnapshot { .. }) {
            out.push(event);
        }
    }
    out
}

fn settings(policy: VisibilityPolicy) -> SessionSettings {
    SessionSettings {
        duration_secs: 1500,
        policy,
    }
}

// ============================================================================
// Controller scenarios
// ============================================================================

#[test]
fn full_session_plants_one_tree_and_resets() {
    let mut session = SessionController::new(settings(VisibilityPolicy::Immediate));
    session.start();

    let mut completions = 0;
    for n in 1..=1500u64 {
        if let Some(Event::SessionCompleted { .. }) = session.tick() {
            completions += 1;
        } else {
            assert_eq!(session.remaining_secs(), 1500 - n);
            assert_eq!(session.status(), SessionStatus::Running);
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(session.status(), SessionStatus::Completed);

    session.settle();
    assert_eq!(session.forest().len(), 1);
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(session.remaining_secs(), 1500);
}

#[test]
fn leaving_after_ten_ticks_withers() {
    let mut session = SessionController::new(settings(VisibilityPolicy::Immediate));
    session.start();
    for _ in 0..10 {
        session.tick();
    }
    session.report_visibility_lost();
    assert_eq!(session.status(), SessionStatus::Withering);
    assert_eq!(session.forest().len(), 0);

    session.settle();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(session.remaining_secs(), 1500);
}

#[test]
fn warning_then_continue_keeps_time() {
    let mut session = SessionController::new(settings(VisibilityPolicy::Confirm));
    session.start();
    let before = session.remaining_secs();
    session.report_visibility_lost();
    assert_eq!(session.status(), SessionStatus::WarningPending);

    session.acknowledge_warning(WarningChoice::Continue);
    assert_eq!(session.status(), SessionStatus::Running);
    assert_eq!(session.remaining_secs(), before);
}

#[test]
fn withered_session_can_be_followed_by_a_completed_one() {
    let mut session = SessionController::new(SessionSettings {
        duration_secs: 5,
        policy: VisibilityPolicy::Immediate,
    });
    session.start();
    session.tick();
    session.report_visibility_lost();
    session.settle();

    session.start();
    for _ in 0..5 {
        session.tick();
    }
    session.settle();
    let forest = session.forest_snapshot();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, 1);
}

// ============================================================================
// Runtime scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn runtime_full_session_with_default_hold() {
    let (clock, pulses) = ManualClock::new();
    let (visibility, _visibility) = ChannelVisibility::new();
    let controller = SessionController::new(settings(VisibilityPolicy::Immediate));
    let (handle, task) =
        SessionRuntime::spawn(controller, clock, visibility, RuntimeOptions::default());
    let mut snapshots = handle.watch();

    handle.start();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Running)
        .await
        .unwrap();
    for _ in 0..1500 {
        assert!(pulses.pulse());
    }
    snapshots
        .wait_for(|s| s.status == SessionStatus::Completed)
        .await
        .unwrap();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Idle)
        .await
        .unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.forest.len(), 1);
    assert_eq!(snap.remaining_secs, 1500);
    assert_eq!(snap.formatted_time, "25:00");

    handle.shutdown();
    let controller = task.await.unwrap();
    assert_eq!(controller.forest().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn runtime_wither_resets_after_hold() {
    let (clock, pulses) = ManualClock::new();
    let (visibility, host) = ChannelVisibility::new();
    let controller = SessionController::new(settings(VisibilityPolicy::Immediate));
    let (handle, _task) =
        SessionRuntime::spawn(controller, clock, visibility, RuntimeOptions::default());
    let mut snapshots = handle.watch();
    let mut events = handle.subscribe_events();

    handle.start();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Running)
        .await
        .unwrap();
    for _ in 0..10 {
        pulses.pulse();
    }
    snapshots.wait_for(|s| s.remaining_secs == 1490).await.unwrap();

    host.lost();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Withering)
        .await
        .unwrap();
    assert!(handle.snapshot().forest.is_empty());
    assert!(!pulses.is_subscribed());

    // Nothing happens before the hold is over.
    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert_eq!(handle.snapshot().status, SessionStatus::Withering);

    snapshots
        .wait_for(|s| s.status == SessionStatus::Idle)
        .await
        .unwrap();
    assert_eq!(handle.snapshot().remaining_secs, 1500);

    let transitions = drain_transitions(&mut events);
    assert_eq!(transitions.len(), 3, "{transitions:?}");
    assert!(matches!(transitions[0], Event::SessionStarted { .. }));
    assert!(matches!(
        transitions[1],
        Event::SessionInterrupted { remaining_secs: 1490, .. }
    ));
    assert!(matches!(
        transitions[2],
        Event::SessionReset { from: SessionStatus::Withering, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn runtime_ignores_start_while_holding() {
    let (clock, pulses) = ManualClock::new();
    let (visibility, host) = ChannelVisibility::new();
    let controller = SessionController::new(settings(VisibilityPolicy::Immediate));
    let (handle, _task) =
        SessionRuntime::spawn(controller, clock, visibility, RuntimeOptions::default());
    let mut snapshots = handle.watch();

    handle.start();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Running)
        .await
        .unwrap();
    host.lost();
    snapshots
        .wait_for(|s| s.status == SessionStatus::Withering)
        .await
        .unwrap();

    handle.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.snapshot().status, SessionStatus::Withering);
    assert!(!pulses.is_subscribed());
}
