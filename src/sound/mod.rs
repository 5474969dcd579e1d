//! Sound cues for break transitions.
//!
//! This module plays short audible cues when a break completes or is
//! dismissed. Playback is best-effort: a machine without an audio device
//! gets log lines instead of sound, never an error that reaches the
//! scheduler.

mod error;
mod player;

use std::sync::Mutex;

pub use error::SoundError;
pub use player::RodioCuePlayer;

/// The audible cues the scheduler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// A break finished naturally
    Complete,
    /// A break was postponed or skipped
    Dismiss,
}

impl SoundCue {
    /// Returns the string representation of the cue.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Complete => "complete",
            SoundCue::Dismiss => "dismiss",
        }
    }
}

/// Trait for cue playback implementations.
///
/// Abstracts playback so the scheduler can be tested with a mock and so the
/// daemon can degrade to silence when audio is unavailable.
pub trait CuePlayer: Send + Sync {
    /// Plays the given cue.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, cue: SoundCue) -> Result<(), SoundError>;
}

/// Cue player that never produces sound.
///
/// Used when audio initialization fails or sound is disabled.
#[derive(Debug, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&self, cue: SoundCue) -> Result<(), SoundError> {
        tracing::debug!("Sound disabled, skipping cue: {}", cue.as_str());
        Ok(())
    }
}

/// Mock cue player for testing.
#[derive(Debug, Default)]
pub struct MockCuePlayer {
    played: Mutex<Vec<SoundCue>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockCuePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn played(&self) -> Vec<SoundCue> {
        self.played.lock().unwrap().clone()
    }

    #[must_use]
    pub fn play_count(&self, cue: SoundCue) -> usize {
        self.played.lock().unwrap().iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        self.played.lock().unwrap().clear();
    }
}

impl CuePlayer for MockCuePlayer {
    fn play(&self, cue: SoundCue) -> Result<(), SoundError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_as_str() {
        assert_eq!(SoundCue::Complete.as_str(), "complete");
        assert_eq!(SoundCue::Dismiss.as_str(), "dismiss");
    }

    #[test]
    fn test_mock_records_cues() {
        let player = MockCuePlayer::new();
        player.play(SoundCue::Complete).unwrap();
        player.play(SoundCue::Dismiss).unwrap();
        player.play(SoundCue::Complete).unwrap();

        assert_eq!(player.play_count(SoundCue::Complete), 2);
        assert_eq!(player.play_count(SoundCue::Dismiss), 1);
    }

    #[test]
    fn test_mock_failure() {
        let player = MockCuePlayer::new();
        player.set_should_fail(true);
        assert!(player.play(SoundCue::Complete).is_err());
        assert!(player.played().is_empty());
    }

    #[test]
    fn test_silent_player_always_succeeds() {
        let player = SilentCuePlayer;
        assert!(player.play(SoundCue::Complete).is_ok());
        assert!(player.play(SoundCue::Dismiss).is_ok());
    }
}
