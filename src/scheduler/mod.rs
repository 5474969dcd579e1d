//! Break scheduling core.
//!
//! This module contains the state machine that drives work/break cycles:
//! - `clock`: the time source abstraction (real and manual)
//! - `event`: events published for the presentation side
//! - `engine`: the scheduler itself

mod clock;
mod engine;
mod event;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::RestScheduler;
pub use event::ScheduleEvent;
