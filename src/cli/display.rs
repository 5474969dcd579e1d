//! Display utilities for the RestMode CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Schedule status display

use chrono::Local;

use crate::types::{BreakKind, BreakPhase, IpcResponse, ScheduleSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message for a schedule-changing command.
    pub fn show_success(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(data) = &response.data {
            match data.phase {
                BreakPhase::Working => {
                    println!(
                        "  次の休憩: {}",
                        data.next_break_at.with_timezone(&Local).format("%H:%M:%S")
                    );
                }
                BreakPhase::CountingDown | BreakPhase::OnBreak => {
                    let (minutes, seconds) = Self::format_time(data.remaining_seconds);
                    println!("  残り時間: {}:{:02}", minutes, seconds);
                }
            }
        }
    }

    /// Shows the current schedule status.
    pub fn show_status(response: &IpcResponse) {
        println!("RestMode ステータス");
        println!("─────────────────────────────");

        let Some(data) = &response.data else {
            println!("状態: 不明");
            return;
        };

        println!("状態: {}", Self::phase_display(data));

        match data.phase {
            BreakPhase::Working => {
                println!(
                    "次の休憩: {}",
                    data.next_break_at.with_timezone(&Local).format("%H:%M:%S")
                );
                println!("経過: {:.0}%", data.progress * 100.0);
            }
            BreakPhase::CountingDown | BreakPhase::OnBreak => {
                let (minutes, seconds) = Self::format_time(data.remaining_seconds);
                println!("残り時間: {}:{:02}", minutes, seconds);
            }
        }

        println!("完了した短い休憩: {}", data.completed_short_breaks);
        if !data.postpone_allowed {
            println!("スキップ: 無効");
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    fn phase_display(data: &ScheduleSnapshot) -> &'static str {
        match data.phase {
            BreakPhase::Working if data.idle_paused => "作業中（アイドルで一時停止）",
            BreakPhase::Working => "作業中",
            BreakPhase::CountingDown => "休憩前カウントダウン",
            BreakPhase::OnBreak => match data.break_kind {
                BreakKind::Long => "長い休憩中",
                _ => "休憩中",
            },
        }
    }

    /// Converts seconds to (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        (total_seconds / 60, total_seconds % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(phase: BreakPhase, kind: BreakKind) -> ScheduleSnapshot {
        ScheduleSnapshot {
            phase,
            break_kind: kind,
            remaining_seconds: 90,
            next_break_at: Utc::now(),
            progress: 0.25,
            completed_short_breaks: 1,
            postpone_allowed: true,
            idle_paused: false,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(Display::format_time(0), (0, 0));
        assert_eq!(Display::format_time(59), (0, 59));
        assert_eq!(Display::format_time(60), (1, 0));
        assert_eq!(Display::format_time(1501), (25, 1));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            Display::phase_display(&snapshot(BreakPhase::Working, BreakKind::None)),
            "作業中"
        );
        assert_eq!(
            Display::phase_display(&snapshot(BreakPhase::CountingDown, BreakKind::Short)),
            "休憩前カウントダウン"
        );
        assert_eq!(
            Display::phase_display(&snapshot(BreakPhase::OnBreak, BreakKind::Short)),
            "休憩中"
        );
        assert_eq!(
            Display::phase_display(&snapshot(BreakPhase::OnBreak, BreakKind::Long)),
            "長い休憩中"
        );
    }

    #[test]
    fn test_phase_display_idle_paused() {
        let mut data = snapshot(BreakPhase::Working, BreakKind::None);
        data.idle_paused = true;
        assert_eq!(Display::phase_display(&data), "作業中（アイドルで一時停止）");
    }

    #[test]
    fn test_show_functions_do_not_panic() {
        let response = IpcResponse::success(
            "休憩を開始しました",
            Some(snapshot(BreakPhase::OnBreak, BreakKind::Short)),
        );
        Display::show_success(&response);
        Display::show_status(&response);
        Display::show_status(&IpcResponse::success("OK", None));
        Display::show_error("テスト");
    }
}
