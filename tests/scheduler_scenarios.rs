//! End-to-end schedule scenarios driven with simulated time.
//!
//! These tests exercise the scheduler through whole work/break cycles using
//! the manual clock, the way the daemon would drive it over hours of real
//! time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use restmode::{
    BreakKind, BreakPhase, ManualClock, MockCuePlayer, MockIdleSource, MockNotifier,
    RestScheduler, ScheduleEvent, Settings, SoundCue,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn start_instant() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-04-10T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

struct Fixture {
    scheduler: RestScheduler,
    clock: Arc<ManualClock>,
    idle: Arc<MockIdleSource>,
    notifier: Arc<MockNotifier>,
    cues: Arc<MockCuePlayer>,
    rx: mpsc::UnboundedReceiver<ScheduleEvent>,
}

impl Fixture {
    fn new(settings: Settings) -> Self {
        let clock = Arc::new(ManualClock::new(start_instant()));
        let idle = Arc::new(MockIdleSource::new());
        let notifier = Arc::new(MockNotifier::new());
        let cues = Arc::new(MockCuePlayer::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = RestScheduler::new(
            settings,
            clock.clone(),
            idle.clone(),
            notifier.clone(),
            cues.clone(),
            tx,
        );

        Self {
            scheduler,
            clock,
            idle,
            notifier,
            cues,
            rx,
        }
    }

    fn advance(&mut self, seconds: i64) {
        for _ in 0..seconds {
            self.clock.advance_secs(1);
            self.scheduler.tick();
        }
    }

    fn events(&mut self) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Compressed cycle: 1 minute of work, 20 s short breaks, a long break
/// every 3rd, no countdown, no idle handling.
fn scenario_settings() -> Settings {
    Settings {
        work_minutes: 1,
        short_break_seconds: 20,
        long_break_seconds: 40,
        long_break_interval: 3,
        long_breaks_enabled: true,
        countdown_enabled: false,
        pause_on_idle: false,
        reset_on_idle: false,
        ..Settings::default()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// Three full cycles: the third break must be long (since (2+1)%3 == 0) and
/// the counter must be back at zero afterwards.
#[test]
fn three_cycles_make_the_third_break_long() {
    let mut fixture = Fixture::new(scenario_settings());
    let mut seen_kinds = Vec::new();

    for _ in 0..3 {
        // Work interval runs out
        fixture.advance(60);
        let snapshot = fixture.scheduler.snapshot();
        assert_eq!(snapshot.phase, BreakPhase::OnBreak);
        seen_kinds.push(snapshot.break_kind);

        // Break runs out
        fixture.advance(i64::from(snapshot.remaining_seconds));
        assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::Working);
    }

    assert_eq!(
        seen_kinds,
        vec![BreakKind::Short, BreakKind::Short, BreakKind::Long]
    );
    assert_eq!(fixture.scheduler.snapshot().completed_short_breaks, 0);

    // One complete cue per break, no dismissals
    assert_eq!(fixture.cues.play_count(SoundCue::Complete), 3);
    assert_eq!(fixture.cues.play_count(SoundCue::Dismiss), 0);
}

/// A day of uninterrupted cycles keeps the cadence: every third break long.
#[test]
fn cadence_holds_over_many_cycles() {
    let mut fixture = Fixture::new(scenario_settings());

    for cycle in 1..=9 {
        fixture.advance(60);
        let snapshot = fixture.scheduler.snapshot();
        let expected = if cycle % 3 == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        };
        assert_eq!(snapshot.break_kind, expected, "cycle {}", cycle);
        fixture.advance(i64::from(snapshot.remaining_seconds));
    }
}

/// Postponing keeps pushing the break away; the schedule stays in Working
/// and each postponement reschedules the notification.
#[test]
fn serial_postponements_keep_working() {
    let mut fixture = Fixture::new(scenario_settings());

    fixture.advance(60);
    assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::OnBreak);

    for _ in 0..3 {
        fixture.scheduler.postpone_break(1);
        assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::Working);
        // Work the postponed minute down to the next break
        fixture.advance(60);
        assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::OnBreak);
    }

    // Each postponement dismissed an active break
    assert_eq!(fixture.cues.play_count(SoundCue::Dismiss), 3);
    // The postponed break still completes and counts
    fixture.advance(20);
    assert_eq!(fixture.scheduler.snapshot().completed_short_breaks, 1);
}

/// The full countdown path: working → countdown → break → working.
#[test]
fn countdown_cycle_reaches_working_again() {
    let mut fixture = Fixture::new(Settings {
        countdown_enabled: true,
        countdown_seconds: 5,
        ..scenario_settings()
    });

    fixture.advance(60);
    assert_eq!(
        fixture.scheduler.snapshot().phase,
        BreakPhase::CountingDown
    );

    fixture.advance(5);
    assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::OnBreak);

    fixture.advance(20);
    let snapshot = fixture.scheduler.snapshot();
    assert_eq!(snapshot.phase, BreakPhase::Working);
    assert_eq!(snapshot.completed_short_breaks, 1);
}

/// Simulated afternoon away from the desk: pause first, then the longer
/// threshold resets the whole interval, and work resumes cleanly.
#[test]
fn long_absence_pauses_then_resets() {
    let mut fixture = Fixture::new(Settings {
        pause_on_idle: true,
        pause_after_minutes: 1,
        reset_on_idle: true,
        reset_after_minutes: 5,
        ..scenario_settings()
    });

    // Bank one completed break so the reset is observable
    fixture.scheduler.start_break();
    fixture.advance(20);
    assert_eq!(fixture.scheduler.snapshot().completed_short_breaks, 1);

    // Idle crosses the pause threshold
    fixture.idle.set_idle_seconds(65.0);
    fixture.advance(1);
    assert!(fixture.scheduler.snapshot().idle_paused);

    // ... and later the reset threshold
    fixture.idle.set_idle_seconds(301.0);
    fixture.advance(1);
    let snapshot = fixture.scheduler.snapshot();
    assert_eq!(snapshot.completed_short_breaks, 0);

    // Back at the desk: the schedule resumes with the reset interval
    fixture.idle.set_idle_seconds(0.0);
    fixture.advance(1);
    assert!(!fixture.scheduler.snapshot().idle_paused);

    let events = fixture.events();
    assert!(events.contains(&ScheduleEvent::IdlePaused { idle_seconds: 65.0 }));
    assert!(events.contains(&ScheduleEvent::IdleReset));
    assert!(events.contains(&ScheduleEvent::IdleResumed));
}

/// Every notification the scheduler plants fires at the next break moment.
#[test]
fn notifications_track_next_break_at() {
    let mut fixture = Fixture::new(scenario_settings());

    // Initial schedule: one work interval away
    assert_eq!(
        fixture.notifier.last_scheduled().unwrap().fire_in,
        std::time::Duration::from_secs(60)
    );

    // Extending the interval moves the notification too
    fixture.advance(10);
    fixture.scheduler.add_work_time(2);
    assert_eq!(
        fixture.notifier.last_scheduled().unwrap().fire_in,
        std::time::Duration::from_secs(50 + 120)
    );

    // Entering the break cancels the pending notification
    let cancels_before = fixture.notifier.cancel_count();
    fixture.scheduler.start_break();
    assert!(fixture.notifier.cancel_count() > cancels_before);
}

/// Cleanup mid-break: timers stop, notifications are cancelled, and a
/// subsequent cleanup or tick changes nothing.
#[test]
fn cleanup_mid_break_is_final_and_idempotent() {
    let mut fixture = Fixture::new(scenario_settings());

    fixture.advance(65);
    assert_eq!(fixture.scheduler.snapshot().phase, BreakPhase::OnBreak);

    fixture.scheduler.cleanup();
    fixture.scheduler.cleanup();
    assert!(fixture.scheduler.is_shutting_down());

    let frozen = fixture.scheduler.snapshot();
    fixture.advance(600);
    assert_eq!(fixture.scheduler.snapshot(), frozen);
}
