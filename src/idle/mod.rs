//! System idle time detection.
//!
//! The scheduler pauses or resets the work interval based on how long the
//! user has been away from the keyboard. The query itself is a collaborator
//! behind the [`IdleSource`] trait so tests can simulate idleness.

use std::sync::Mutex;

/// Trait for idle time sources.
pub trait IdleSource: Send + Sync {
    /// Returns the seconds elapsed since the last user input event.
    fn idle_seconds(&self) -> f64;
}

/// Idle time source backed by the operating system.
///
/// On macOS this asks the HID event system how long ago the last input
/// event of any type occurred. On other platforms it reports zero, which
/// disables idle handling.
#[derive(Debug, Default)]
pub struct SystemIdleSource;

impl SystemIdleSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdleSource for SystemIdleSource {
    fn idle_seconds(&self) -> f64 {
        #[cfg(target_os = "macos")]
        {
            #[link(name = "CoreGraphics", kind = "framework")]
            extern "C" {
                fn CGEventSourceSecondsSinceLastEventType(state: i32, event_type: u32) -> f64;
            }
            // kCGEventSourceStateCombinedSessionState = 0
            // kCGAnyInputEventType = u32::MAX
            unsafe { CGEventSourceSecondsSinceLastEventType(0, u32::MAX) }
        }
        #[cfg(not(target_os = "macos"))]
        {
            0.0
        }
    }
}

/// Mock idle source with a settable value, for testing.
#[derive(Debug, Default)]
pub struct MockIdleSource {
    seconds: Mutex<f64>,
}

impl MockIdleSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported idle time.
    pub fn set_idle_seconds(&self, seconds: f64) {
        *self.seconds.lock().unwrap() = seconds;
    }
}

impl IdleSource for MockIdleSource {
    fn idle_seconds(&self) -> f64 {
        *self.seconds.lock().unwrap()
    }
}
