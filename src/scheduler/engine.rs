//! The break scheduling engine.
//!
//! This module provides the core scheduler functionality:
//! - State transitions (Working → CountingDown → OnBreak → Working)
//! - Wall-clock work interval with a 1-second tick
//! - Long break cadence (every N-th break)
//! - Idle-based pausing and resetting
//! - Notification scheduling and sound cues at transitions

use std::sync::Arc;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::idle::IdleSource;
use crate::notification::BreakNotifier;
use crate::settings::Settings;
use crate::sound::{CuePlayer, SoundCue};
use crate::types::{BreakKind, BreakPhase, ScheduleSnapshot, ScheduleState};

use super::clock::Clock;
use super::event::ScheduleEvent;

/// Title of the break-due notification.
const BREAK_NOTIFICATION_TITLE: &str = "Time for an Eye Break";

/// Body of the break-due notification.
const BREAK_NOTIFICATION_BODY: &str =
    "Taking regular breaks helps reduce eye strain and maintain productivity.";

// ============================================================================
// RestScheduler
// ============================================================================

/// The break scheduler.
///
/// A synchronous state machine with a single clock-driven entry point,
/// [`tick`](Self::tick), called once per second by the daemon. The daemon
/// keeps it behind a mutex, which serializes every mutating operation: a
/// menu click racing a timer firing cannot interleave.
///
/// Exactly one of the three conceptual timers (work, countdown, break) is
/// running at any time; which one is implied by the phase.
pub struct RestScheduler {
    /// Current schedule state
    state: ScheduleState,
    /// Settings snapshot, replaced via [`apply_settings`](Self::apply_settings)
    settings: Settings,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Idle time source
    idle: Arc<dyn IdleSource>,
    /// Break notification dispatcher
    notifier: Arc<dyn BreakNotifier>,
    /// Sound cue dispatcher
    cues: Arc<dyn CuePlayer>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<ScheduleEvent>,
    /// Suppresses repeated idle resets during one idle stretch
    idle_reset_done: bool,
    /// Set once by cleanup; every mutating operation checks it first
    shutting_down: bool,
}

impl RestScheduler {
    /// Creates a scheduler: working, with the first break one full work
    /// interval away, and the break-due notification scheduled.
    pub fn new(
        settings: Settings,
        clock: Arc<dyn Clock>,
        idle: Arc<dyn IdleSource>,
        notifier: Arc<dyn BreakNotifier>,
        cues: Arc<dyn CuePlayer>,
        event_tx: mpsc::UnboundedSender<ScheduleEvent>,
    ) -> Self {
        let now = clock.now();
        let mut state = ScheduleState::new(now, settings.work_minutes);
        state.postpone_allowed = !settings.hide_skip_button;

        let scheduler = Self {
            state,
            settings,
            clock,
            idle,
            notifier,
            cues,
            event_tx,
            idle_reset_done: false,
            shutting_down: false,
        };
        // A dormant schedule (start-on-launch disabled) gets its first
        // notification from begin_work_interval instead.
        if scheduler.settings.start_timer_on_launch {
            scheduler.schedule_notification(now);
        }
        scheduler
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances the schedule by one second.
    ///
    /// The daemon calls this from its 1-second interval; tests call it with
    /// a manual clock. Ticks after cleanup are ignored.
    pub fn tick(&mut self) {
        if self.shutting_down {
            return;
        }

        let now = self.clock.now();
        match self.state.phase {
            BreakPhase::Working => self.tick_working(now),
            BreakPhase::CountingDown => self.tick_countdown(),
            BreakPhase::OnBreak => self.tick_break(now),
        }
    }

    fn tick_working(&mut self, now: DateTime<Utc>) {
        let idle_seconds = self.idle.idle_seconds();

        if self.state.idle_paused {
            if self.should_reset_for_idle(idle_seconds) {
                self.reset_after_idle(now);
            } else if idle_seconds < self.pause_threshold_seconds() {
                self.state.idle_paused = false;
                self.idle_reset_done = false;
                info!("Idle ended, work timer resumed");
                self.emit(ScheduleEvent::IdleResumed);
            }
            // Frozen: no progress update, no break trigger.
            return;
        }

        if self.should_reset_for_idle(idle_seconds) {
            self.reset_after_idle(now);
            return;
        }
        if self.settings.pause_on_idle && idle_seconds >= self.pause_threshold_seconds() {
            self.state.idle_paused = true;
            info!("User idle for {:.0}s, work timer paused", idle_seconds);
            self.emit(ScheduleEvent::IdlePaused { idle_seconds });
            return;
        }

        self.state.update_progress(now, self.settings.work_minutes);
        self.emit(ScheduleEvent::Tick {
            phase: self.state.phase,
            remaining_seconds: 0,
            progress: self.state.progress,
        });

        if now >= self.state.next_break_at {
            self.begin_break();
        }
    }

    fn tick_countdown(&mut self) {
        let completed = self.state.tick_down();
        self.emit(ScheduleEvent::Tick {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            progress: self.state.progress,
        });

        if completed {
            // The kind was fixed when the countdown started.
            self.enter_break(self.state.break_kind);
        }
    }

    fn tick_break(&mut self, now: DateTime<Utc>) {
        let completed = self.state.tick_down();
        self.emit(ScheduleEvent::Tick {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            progress: self.state.progress,
        });

        if completed {
            self.complete_break(now);
        }
    }

    // ------------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------------

    /// Starts a break immediately.
    ///
    /// Ignored while a break or its countdown is already active.
    pub fn start_break(&mut self) {
        if self.shutting_down {
            debug!("start_break ignored, scheduler is shutting down");
            return;
        }
        if self.state.phase.is_break_active() {
            debug!("start_break ignored, a break is already active");
            return;
        }
        self.begin_break();
    }

    /// Ends or pushes back the break, resuming work for `minutes`.
    ///
    /// Valid in every phase: during a break or countdown it dismisses the
    /// break; while working it just moves the next break.
    pub fn postpone_break(&mut self, minutes: u32) {
        if self.shutting_down {
            debug!("postpone_break ignored, scheduler is shutting down");
            return;
        }
        let now = self.clock.now();
        self.return_to_work_for(now, minutes, false);
        info!("Break postponed by {} minutes", minutes);
        self.emit(ScheduleEvent::BreakPostponed { minutes });
    }

    /// Skips the break entirely: a full work interval of postponement.
    pub fn skip_break(&mut self) {
        if self.shutting_down {
            debug!("skip_break ignored, scheduler is shutting down");
            return;
        }
        let now = self.clock.now();
        let minutes = self.settings.work_minutes;
        self.return_to_work_for(now, minutes, true);
        info!("Break skipped");
        self.emit(ScheduleEvent::BreakSkipped);
    }

    /// Extends the current work interval by `minutes`.
    ///
    /// A no-op while a break or its countdown is active.
    pub fn add_work_time(&mut self, minutes: u32) {
        if self.shutting_down {
            debug!("add_work_time ignored, scheduler is shutting down");
            return;
        }
        if self.state.phase != BreakPhase::Working {
            debug!("add_work_time ignored while a break is active");
            return;
        }

        let now = self.clock.now();
        self.state.next_break_at += TimeDelta::minutes(i64::from(minutes));
        self.state.update_progress(now, self.settings.work_minutes);
        self.schedule_notification(now);
        info!("Work interval extended by {} minutes", minutes);
        self.emit(ScheduleEvent::WorkExtended { minutes });
    }

    /// Replaces the settings snapshot.
    ///
    /// A changed work duration restarts the current interval when working;
    /// break and countdown lengths take effect at their next use.
    pub fn apply_settings(&mut self, settings: Settings) {
        if self.shutting_down {
            debug!("apply_settings ignored, scheduler is shutting down");
            return;
        }

        let work_changed = settings.work_minutes != self.settings.work_minutes;
        self.settings = settings;
        self.state.postpone_allowed = !self.settings.hide_skip_button;

        if work_changed && self.state.phase == BreakPhase::Working {
            let now = self.clock.now();
            self.state
                .return_to_work(now + TimeDelta::minutes(i64::from(self.settings.work_minutes)));
            self.schedule_notification(now);
            info!(
                "Work interval changed, next break in {} minutes",
                self.settings.work_minutes
            );
        }
    }

    /// Restarts the work interval from now.
    ///
    /// Used by the daemon when a dormant scheduler (start-on-launch
    /// disabled) is activated by the first client command.
    pub fn begin_work_interval(&mut self) {
        if self.shutting_down {
            debug!("begin_work_interval ignored, scheduler is shutting down");
            return;
        }
        let now = self.clock.now();
        self.state
            .return_to_work(now + TimeDelta::minutes(i64::from(self.settings.work_minutes)));
        self.schedule_notification(now);
    }

    /// Shuts the scheduler down: cancels pending notifications and makes
    /// every further operation (ticks included) a no-op.
    ///
    /// Idempotent; safe to call from signal handlers racing timer callbacks.
    pub fn cleanup(&mut self) {
        if self.shutting_down {
            debug!("cleanup already ran");
            return;
        }
        self.shutting_down = true;
        self.notifier.cancel_pending();
        self.emit(ScheduleEvent::ShutDown);
        info!("Scheduler cleaned up");
    }

    /// Returns an observable copy of the current state.
    pub fn snapshot(&self) -> ScheduleSnapshot {
        self.state.snapshot()
    }

    /// Returns true once cleanup has begun.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Enters the countdown (or the break itself when no countdown is
    /// configured). The break kind is decided here and held fixed.
    fn begin_break(&mut self) {
        let kind = self
            .state
            .upcoming_break_kind(self.settings.long_breaks_enabled, self.settings.long_break_interval);

        self.state.postpone_allowed = !self.settings.hide_skip_button;
        self.state.idle_paused = false;
        self.idle_reset_done = false;
        // The break is starting; a "break due" notification is now stale.
        self.notifier.cancel_pending();

        if self.settings.countdown_enabled && self.settings.countdown_seconds > 0 {
            self.state.phase = BreakPhase::CountingDown;
            self.state.break_kind = kind;
            self.state.remaining_seconds = self.settings.countdown_seconds;
            debug!("Countdown to {} break started", kind.as_str());
            self.emit(ScheduleEvent::CountdownStarted {
                kind,
                seconds: self.settings.countdown_seconds,
            });
        } else {
            self.enter_break(kind);
        }
    }

    fn enter_break(&mut self, kind: BreakKind) {
        let seconds = self.settings.break_seconds(kind);
        self.state.phase = BreakPhase::OnBreak;
        self.state.break_kind = kind;
        self.state.remaining_seconds = seconds;
        info!("{} break started ({}s)", kind.as_str(), seconds);
        self.emit(ScheduleEvent::BreakStarted { kind, seconds });
    }

    fn complete_break(&mut self, now: DateTime<Utc>) {
        let kind = self.state.break_kind;
        match kind {
            BreakKind::Long => self.state.completed_short_breaks = 0,
            _ => self.state.completed_short_breaks += 1,
        }

        self.play_cue(SoundCue::Complete);
        self.state
            .return_to_work(now + TimeDelta::minutes(i64::from(self.settings.work_minutes)));
        self.schedule_notification(now);
        info!(
            "{} break completed, next break in {} minutes",
            kind.as_str(),
            self.settings.work_minutes
        );
        self.emit(ScheduleEvent::BreakCompleted { kind });
    }

    /// Shared postpone/skip path: leaves any active break and resumes work
    /// with the next break `minutes` away.
    fn return_to_work_for(&mut self, now: DateTime<Utc>, minutes: u32, force_dismiss_cue: bool) {
        let was_break_active = self.state.phase.is_break_active();

        // A long break cut short still closes out the cadence.
        if self.state.phase == BreakPhase::OnBreak && self.state.break_kind == BreakKind::Long {
            self.state.completed_short_breaks = 0;
        }

        if was_break_active || force_dismiss_cue {
            self.play_cue(SoundCue::Dismiss);
        }

        self.state.idle_paused = false;
        self.idle_reset_done = false;
        self.state.return_to_work(now + TimeDelta::minutes(i64::from(minutes)));
        self.state.update_progress(now, self.settings.work_minutes);
        self.schedule_notification(now);
    }

    // ------------------------------------------------------------------------
    // Idle handling
    // ------------------------------------------------------------------------

    fn pause_threshold_seconds(&self) -> f64 {
        f64::from(self.settings.pause_after_minutes) * 60.0
    }

    fn should_reset_for_idle(&self, idle_seconds: f64) -> bool {
        self.settings.reset_on_idle
            && !self.idle_reset_done
            && idle_seconds >= f64::from(self.settings.reset_after_minutes) * 60.0
    }

    /// The user has been away long enough that the whole cycle starts over:
    /// the cadence counter clears and a fresh interval begins. The schedule
    /// then freezes until activity resumes.
    fn reset_after_idle(&mut self, now: DateTime<Utc>) {
        self.state.completed_short_breaks = 0;
        self.state
            .return_to_work(now + TimeDelta::minutes(i64::from(self.settings.work_minutes)));
        self.schedule_notification(now);
        self.idle_reset_done = true;
        self.state.idle_paused = true;
        info!("Long idle stretch, work interval reset");
        self.emit(ScheduleEvent::IdleReset);
    }

    // ------------------------------------------------------------------------
    // Collaborator calls
    // ------------------------------------------------------------------------

    /// Cancels the pending notification and schedules a new one at
    /// `next_break_at`. Nothing is scheduled when the moment has passed.
    fn schedule_notification(&self, now: DateTime<Utc>) {
        self.notifier.cancel_pending();
        let delay = self.state.next_break_at - now;
        if let Ok(fire_in) = delay.to_std() {
            if !fire_in.is_zero() {
                self.notifier
                    .schedule_break(fire_in, BREAK_NOTIFICATION_TITLE, BREAK_NOTIFICATION_BODY);
            }
        }
    }

    fn play_cue(&self, cue: SoundCue) {
        if let Err(e) = self.cues.play(cue) {
            warn!("サウンドを再生できませんでした: {}", e);
        }
    }

    fn emit(&self, event: ScheduleEvent) {
        // The receiver side going away must not break the schedule.
        let _ = self.event_tx.send(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
