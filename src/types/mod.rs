//! Core data types for RestMode.
//!
//! This module defines the data structures used for:
//! - Break schedule state management
//! - Observable schedule snapshots for the presentation side
//! - IPC request/response serialization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// BreakPhase
// ============================================================================

/// Represents the current phase of the break schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPhase {
    /// Working toward the next break
    Working,
    /// Short pre-break countdown is running
    CountingDown,
    /// A break is in progress
    OnBreak,
}

impl BreakPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakPhase::Working => "working",
            BreakPhase::CountingDown => "counting_down",
            BreakPhase::OnBreak => "on_break",
        }
    }

    /// Returns true if a break (or its countdown) is currently active.
    pub fn is_break_active(&self) -> bool {
        matches!(self, BreakPhase::CountingDown | BreakPhase::OnBreak)
    }
}

impl Default for BreakPhase {
    fn default() -> Self {
        BreakPhase::Working
    }
}

// ============================================================================
// BreakKind
// ============================================================================

/// The kind of break currently scheduled or in progress.
///
/// Fixed when a break starts and held for that break's whole duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// No break is active
    None,
    /// A short break
    Short,
    /// A long break (every `long_break_interval`-th break)
    Long,
}

impl BreakKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::None => "none",
            BreakKind::Short => "short",
            BreakKind::Long => "long",
        }
    }
}

impl Default for BreakKind {
    fn default() -> Self {
        BreakKind::None
    }
}

// ============================================================================
// ScheduleState
// ============================================================================

/// The break scheduler's in-memory state.
///
/// Mutated exclusively by the scheduler's own operations; the presentation
/// side only ever sees [`ScheduleSnapshot`] copies of it.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current phase of the schedule
    pub phase: BreakPhase,
    /// Kind of the active break, `None` while working
    pub break_kind: BreakKind,
    /// Remaining seconds of the active countdown or break
    pub remaining_seconds: u32,
    /// While working, the moment the next break should start
    pub next_break_at: DateTime<Utc>,
    /// Completed short breaks since the last long break
    pub completed_short_breaks: u32,
    /// Fraction of the work interval elapsed, in [0, 1]
    pub progress: f64,
    /// Whether the postpone/skip controls are offered
    pub postpone_allowed: bool,
    /// Whether the work timer is frozen because the user is idle
    pub idle_paused: bool,
}

impl ScheduleState {
    /// Creates a fresh schedule: working, with the next break one full work
    /// interval away.
    pub fn new(now: DateTime<Utc>, work_minutes: u32) -> Self {
        Self {
            phase: BreakPhase::Working,
            break_kind: BreakKind::None,
            remaining_seconds: 0,
            next_break_at: now + chrono::Duration::minutes(i64::from(work_minutes)),
            completed_short_breaks: 0,
            progress: 0.0,
            postpone_allowed: true,
            idle_paused: false,
        }
    }

    /// Determines the kind of the break that would start now.
    ///
    /// The break is long iff long breaks are enabled and this would be the
    /// `long_break_interval`-th break since the last long one.
    pub fn upcoming_break_kind(
        &self,
        long_breaks_enabled: bool,
        long_break_interval: u32,
    ) -> BreakKind {
        if long_breaks_enabled
            && long_break_interval > 0
            && (self.completed_short_breaks + 1) % long_break_interval == 0
        {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    /// Decrements the countdown/break timer by one second.
    ///
    /// Returns true if the timer has completed (reached 0).
    pub fn tick_down(&mut self) -> bool {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        self.remaining_seconds == 0
    }

    /// Returns to the working phase with the next break at `next_break_at`.
    pub fn return_to_work(&mut self, next_break_at: DateTime<Utc>) {
        self.phase = BreakPhase::Working;
        self.break_kind = BreakKind::None;
        self.remaining_seconds = 0;
        self.next_break_at = next_break_at;
        self.progress = 0.0;
    }

    /// Recomputes `progress` from the time left until `next_break_at`.
    pub fn update_progress(&mut self, now: DateTime<Utc>, work_minutes: u32) {
        let total = f64::from(work_minutes) * 60.0;
        let remaining = (self.next_break_at - now).num_milliseconds() as f64 / 1000.0;
        self.progress = ((total - remaining) / total).clamp(0.0, 1.0);
    }

    /// Returns an observable copy of the state.
    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            phase: self.phase,
            break_kind: self.break_kind,
            remaining_seconds: self.remaining_seconds,
            next_break_at: self.next_break_at,
            progress: self.progress,
            completed_short_breaks: self.completed_short_breaks,
            postpone_allowed: self.postpone_allowed,
            idle_paused: self.idle_paused,
        }
    }
}

// ============================================================================
// ScheduleSnapshot
// ============================================================================

/// Serializable view of the schedule state, sent to clients over IPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    /// Current phase
    pub phase: BreakPhase,
    /// Kind of the active break
    pub break_kind: BreakKind,
    /// Remaining seconds of the active countdown or break
    pub remaining_seconds: u32,
    /// When the next break starts (meaningful while working)
    pub next_break_at: DateTime<Utc>,
    /// Fraction of the work interval elapsed
    pub progress: f64,
    /// Completed short breaks since the last long break
    pub completed_short_breaks: u32,
    /// Whether postpone/skip controls are offered
    pub postpone_allowed: bool,
    /// Whether the work timer is frozen for idleness
    pub idle_paused: bool,
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Query the current schedule
    Status,
    /// Start a break immediately
    Break,
    /// Postpone the active break, resuming work for the given minutes
    Postpone {
        /// Minutes of work before the break comes back
        minutes: u32,
    },
    /// Skip the active break entirely (a full work interval of postponement)
    Skip,
    /// Extend the current work interval by the given minutes
    Add {
        /// Minutes to add before the next break
        minutes: u32,
    },
    /// Re-read the settings file and apply it
    Reload,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Schedule snapshot, when the command has one to report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScheduleSnapshot>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ScheduleSnapshot>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
