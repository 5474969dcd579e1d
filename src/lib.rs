//! RestMode Library
//!
//! This library provides the core functionality for the RestMode break
//! reminder. It includes:
//! - Break scheduling engine with work/break state transitions
//! - Settings persistence with change notification
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Native macOS break notifications (macOS only)
//! - Sound cues for break transitions
//! - System idle time detection for pause/reset handling

pub mod cli;
pub mod daemon;
pub mod idle;
pub mod notification;
pub mod scheduler;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    BreakKind, BreakPhase, IpcRequest, IpcResponse, ScheduleSnapshot, ScheduleState,
};

// Re-export the scheduling core
pub use scheduler::{Clock, ManualClock, RestScheduler, ScheduleEvent, SystemClock};

// Re-export settings types
pub use settings::{Settings, SettingsStore};

// Re-export collaborator seams and their test doubles
pub use idle::{IdleSource, MockIdleSource, SystemIdleSource};
pub use notification::{BreakNotifier, LogNotifier, MockNotifier, NotificationError};
pub use sound::{CuePlayer, MockCuePlayer, RodioCuePlayer, SilentCuePlayer, SoundCue, SoundError};

// Re-export the native notifier on macOS
#[cfg(target_os = "macos")]
pub use notification::UserNotificationCenter;
