//! Scheduler events for the presentation side and external integrations.

use crate::types::{BreakKind, BreakPhase};

/// Events published by the scheduler.
///
/// The daemon forwards these to whatever is observing the schedule (log
/// output today; a menu bar or overlay would subscribe the same way).
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEvent {
    /// One second elapsed
    Tick {
        /// Current phase
        phase: BreakPhase,
        /// Remaining seconds of the active countdown or break
        remaining_seconds: u32,
        /// Fraction of the work interval elapsed
        progress: f64,
    },
    /// The pre-break countdown started
    CountdownStarted {
        /// Kind of the upcoming break
        kind: BreakKind,
        /// Countdown length
        seconds: u32,
    },
    /// A break started
    BreakStarted {
        /// Kind of the break
        kind: BreakKind,
        /// Break length
        seconds: u32,
    },
    /// A break ran to its natural end
    BreakCompleted {
        /// Kind of the completed break
        kind: BreakKind,
    },
    /// A break (or the schedule) was pushed back
    BreakPostponed {
        /// Minutes of work before the break comes back
        minutes: u32,
    },
    /// A break was skipped for a full work interval
    BreakSkipped,
    /// The current work interval was extended
    WorkExtended {
        /// Minutes added
        minutes: u32,
    },
    /// The work timer froze because the user went idle
    IdlePaused {
        /// Observed idle time when the pause triggered
        idle_seconds: f64,
    },
    /// The work timer resumed after idleness ended
    IdleResumed,
    /// The work interval was reset after a long idle stretch
    IdleReset,
    /// The scheduler shut down
    ShutDown,
}
