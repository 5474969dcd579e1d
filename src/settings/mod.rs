//! User-configurable settings for the break schedule.
//!
//! This module defines the settings structure consumed by the scheduler and
//! its persistence layer. Values are validated at this boundary; the
//! scheduler itself assumes positive, in-range durations.

mod store;

use serde::{Deserialize, Serialize};

pub use store::SettingsStore;

/// Default work interval in minutes.
fn default_work_minutes() -> u32 {
    60
}

/// Default short break length in seconds.
fn default_short_break_seconds() -> u32 {
    30
}

/// Default long break length in seconds.
fn default_long_break_seconds() -> u32 {
    180
}

/// Default long break cadence (every N-th break is long).
fn default_long_break_interval() -> u32 {
    3
}

/// Default pre-break countdown in seconds.
fn default_countdown_seconds() -> u32 {
    5
}

/// Default idle minutes before the work timer pauses.
fn default_pause_after_minutes() -> u32 {
    1
}

/// Default idle minutes before the work interval resets.
fn default_reset_after_minutes() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Break schedule settings.
///
/// Persisted as JSON at `~/.restmode/settings.json`. Every field has a
/// default so a partial (or missing) file always yields a usable
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Work interval between breaks in minutes (1-240)
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    /// Short break length in seconds (5-3600)
    #[serde(default = "default_short_break_seconds")]
    pub short_break_seconds: u32,

    /// Long break length in seconds (5-3600)
    #[serde(default = "default_long_break_seconds")]
    pub long_break_seconds: u32,

    /// Every N-th break is a long break (1-24)
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,

    /// Whether long breaks happen at all
    #[serde(default = "default_true")]
    pub long_breaks_enabled: bool,

    /// Whether a short countdown runs before each break
    #[serde(default = "default_true")]
    pub countdown_enabled: bool,

    /// Pre-break countdown length in seconds (1-60)
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    /// Whether the skip/postpone controls are hidden
    #[serde(default)]
    pub hide_skip_button: bool,

    /// Whether skipping is blocked right after a break starts.
    /// Carried for the settings surface; no enforcement exists yet.
    #[serde(default = "default_true")]
    pub prevent_skipping: bool,

    /// Whether the work timer pauses when the user goes idle
    #[serde(default = "default_true")]
    pub pause_on_idle: bool,

    /// Idle minutes before the work timer pauses (1-120)
    #[serde(default = "default_pause_after_minutes")]
    pub pause_after_minutes: u32,

    /// Whether the work interval resets after a longer idle stretch
    #[serde(default = "default_true")]
    pub reset_on_idle: bool,

    /// Idle minutes before the work interval resets (1-480)
    #[serde(default = "default_reset_after_minutes")]
    pub reset_after_minutes: u32,

    /// Whether the schedule starts counting as soon as the daemon launches
    #[serde(default = "default_true")]
    pub start_timer_on_launch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
            long_break_interval: default_long_break_interval(),
            long_breaks_enabled: true,
            countdown_enabled: true,
            countdown_seconds: default_countdown_seconds(),
            hide_skip_button: false,
            prevent_skipping: true,
            pause_on_idle: true,
            pause_after_minutes: default_pause_after_minutes(),
            reset_on_idle: true,
            reset_after_minutes: default_reset_after_minutes(),
            start_timer_on_launch: true,
        }
    }
}

impl Settings {
    /// Validates the settings.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.work_minutes < 1 || self.work_minutes > 240 {
            return Err("作業時間は1-240分の範囲で指定してください".to_string());
        }
        if self.short_break_seconds < 5 || self.short_break_seconds > 3600 {
            return Err("短い休憩は5-3600秒の範囲で指定してください".to_string());
        }
        if self.long_break_seconds < 5 || self.long_break_seconds > 3600 {
            return Err("長い休憩は5-3600秒の範囲で指定してください".to_string());
        }
        if self.long_break_interval < 1 || self.long_break_interval > 24 {
            return Err("長い休憩の間隔は1-24回の範囲で指定してください".to_string());
        }
        if self.countdown_seconds < 1 || self.countdown_seconds > 60 {
            return Err("カウントダウンは1-60秒の範囲で指定してください".to_string());
        }
        if self.pause_after_minutes < 1 || self.pause_after_minutes > 120 {
            return Err("アイドル一時停止は1-120分の範囲で指定してください".to_string());
        }
        if self.reset_after_minutes < 1 || self.reset_after_minutes > 480 {
            return Err("アイドルリセットは1-480分の範囲で指定してください".to_string());
        }
        if self.pause_on_idle
            && self.reset_on_idle
            && self.reset_after_minutes < self.pause_after_minutes
        {
            return Err(
                "アイドルリセットの時間は一時停止の時間以上にしてください".to_string(),
            );
        }
        Ok(())
    }

    /// Returns the length of a break of the given kind in seconds.
    pub fn break_seconds(&self, kind: crate::types::BreakKind) -> u32 {
        match kind {
            crate::types::BreakKind::Long => self.long_break_seconds,
            _ => self.short_break_seconds,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakKind;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.work_minutes, 60);
        assert_eq!(settings.short_break_seconds, 30);
        assert_eq!(settings.long_break_seconds, 180);
        assert_eq!(settings.long_break_interval, 3);
        assert_eq!(settings.countdown_seconds, 5);
        assert_eq!(settings.pause_after_minutes, 1);
        assert_eq!(settings.reset_after_minutes, 5);
        assert!(settings.long_breaks_enabled);
        assert!(settings.countdown_enabled);
        assert!(settings.prevent_skipping);
        assert!(settings.pause_on_idle);
        assert!(settings.reset_on_idle);
        assert!(settings.start_timer_on_launch);
        assert!(!settings.hide_skip_button);
    }

    #[test]
    fn test_default_validates() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_boundary_values() {
        let settings = Settings {
            work_minutes: 1,
            short_break_seconds: 5,
            long_break_seconds: 3600,
            long_break_interval: 24,
            countdown_seconds: 60,
            pause_after_minutes: 1,
            reset_after_minutes: 480,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_work_minutes_zero() {
        let settings = Settings {
            work_minutes: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_work_minutes_too_high() {
        let settings = Settings {
            work_minutes: 241,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_break_seconds_out_of_range() {
        let settings = Settings {
            short_break_seconds: 4,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            long_break_seconds: 3601,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_interval_zero() {
        let settings = Settings {
            long_break_interval: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_reset_below_pause() {
        let settings = Settings {
            pause_after_minutes: 10,
            reset_after_minutes: 5,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        // Fine when the reset side is disabled
        let settings = Settings {
            pause_after_minutes: 10,
            reset_after_minutes: 5,
            reset_on_idle: false,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_break_seconds_by_kind() {
        let settings = Settings::default();
        assert_eq!(settings.break_seconds(BreakKind::Short), 30);
        assert_eq!(settings.break_seconds(BreakKind::Long), 180);
        assert_eq!(settings.break_seconds(BreakKind::None), 30);
    }

    #[test]
    fn test_deserialize_partial_file_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"workMinutes":45}"#).unwrap();
        assert_eq!(settings.work_minutes, 45);
        assert_eq!(settings.short_break_seconds, 30);
        assert!(settings.countdown_enabled);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let settings = Settings {
            work_minutes: 45,
            hide_skip_button: true,
            ..Settings::default()
        };

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"workMinutes\":45"));
        assert!(json.contains("\"hideSkipButton\":true"));

        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
