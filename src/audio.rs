//! Stage music
//!
//! Each background stage may carry a looping track. Playback goes through a
//! `MusicBackend` so the game runs the same with or without an audio device;
//! any backend failure is logged and the game continues silently.

use std::fmt;
use std::path::{Path, PathBuf};

/// Audio backend failure (never surfaced to the player)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device could be opened
    DeviceUnavailable,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::DeviceUnavailable => write!(f, "audio device unavailable"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Something that can loop one music track at a time
pub trait MusicBackend: fmt::Debug {
    /// Start looping `path`, replacing whatever was playing
    fn play_loop(&mut self, path: &Path, volume: f32) -> Result<(), AudioError>;
    fn set_volume(&mut self, volume: f32);
    fn stop(&mut self);
}

/// Backend that plays nothing
#[derive(Debug, Default)]
pub struct NullBackend;

impl MusicBackend for NullBackend {
    fn play_loop(&mut self, _path: &Path, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn stop(&mut self) {}
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager {
    backend: Box<dyn MusicBackend>,
    master_volume: f32,
    music_volume: f32,
    muted: bool,
    current: Option<PathBuf>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullBackend))
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn MusicBackend>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            music_volume: 0.7,
            muted: false,
            current: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.backend.set_volume(self.effective_volume());
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.backend.set_volume(self.effective_volume());
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.backend.set_volume(self.effective_volume());
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Track currently looping, if any
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Switch to a stage's track; `None` (or a failure) means silence
    pub fn play_stage_track(&mut self, track: Option<PathBuf>) {
        if track == self.current {
            return;
        }
        self.stop();
        let Some(path) = track else { return };

        match self.backend.play_loop(&path, self.effective_volume()) {
            Ok(()) => {
                log::debug!("Music: {}", path.display());
                self.current = Some(path);
            }
            Err(e) => log::debug!("Music disabled for {}: {e}", path.display()),
        }
    }

    pub fn stop(&mut self) {
        if self.current.take().is_some() {
            self.backend.stop();
        }
    }
}
