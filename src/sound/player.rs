//! Cue player implementation using rodio.
//!
//! Maps each [`SoundCue`] to a macOS system sound and plays it through a
//! rodio v0.20 output stream. Playback is non-blocking and failures degrade
//! to log lines at the call site.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::error::SoundError;
use super::SoundCue;

/// System sound played when a break completes.
const COMPLETE_SOUND_PATH: &str = "/System/Library/Sounds/Glass.aiff";

/// System sound played when a break is dismissed.
const DISMISS_SOUND_PATH: &str = "/System/Library/Sounds/Pop.aiff";

/// A cue player backed by rodio.
///
/// This player is thread-safe and can be shared across threads using `Arc`.
/// Sounds continue playing in the background after `play` returns.
pub struct RodioCuePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioCuePlayer {
    /// Creates a new cue player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays the system sound mapped to the given cue.
    ///
    /// # Errors
    ///
    /// Returns an error if the sound file cannot be opened or decoded, or if
    /// playback fails.
    pub fn play(&self, cue: SoundCue) -> Result<(), SoundError> {
        let path = match cue {
            SoundCue::Complete => COMPLETE_SOUND_PATH,
            SoundCue::Dismiss => DISMISS_SOUND_PATH,
        };
        debug!("Playing cue '{}' from {}", cue.as_str(), path);
        self.play_file(Path::new(path))
    }

    fn play_file(&self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let reader = BufReader::new(file);
        let decoder = Decoder::new(reader).map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?;
        sink.append(decoder);
        sink.detach();

        Ok(())
    }
}

impl super::CuePlayer for RodioCuePlayer {
    fn play(&self, cue: SoundCue) -> Result<(), SoundError> {
        RodioCuePlayer::play(self, cue)
    }
}
