//! Platform layer
//!
//! Owns everything the simulation must not touch directly:
//! - Frame pacing
//! - Input normalization
//! - Asset lookup and music playback

pub mod clock;
pub mod input;

pub use clock::FrameClock;
pub use input::{Key, RawInput, normalize};

use std::path::PathBuf;

use crate::assets::{AssetCache, SpritePool};
use crate::audio::{AudioManager, MusicBackend, NullBackend};
use crate::levels::LevelConfig;
use crate::settings::Settings;

/// Runtime context, created once at startup and passed to the app each frame
#[derive(Debug)]
pub struct Runtime {
    pub settings: Settings,
    pub clock: FrameClock,
    pub assets: AssetCache,
    pub audio: AudioManager,
}

impl Runtime {
    /// Set up with a silent music backend
    pub fn init(settings: Settings) -> Self {
        Self::with_backend(settings, Box::new(NullBackend))
    }

    pub fn with_backend(settings: Settings, backend: Box<dyn MusicBackend>) -> Self {
        let mut audio = AudioManager::new(backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_music_volume(settings.music_volume);
        audio.set_muted(settings.muted);

        log::info!(
            "Runtime ready: {} fps, assets in {}",
            settings.target_fps,
            settings.asset_dir.display()
        );
        Self {
            clock: FrameClock::new(settings.target_fps),
            assets: AssetCache::new(settings.asset_dir.clone()),
            audio,
            settings,
        }
    }

    /// Item sprites for a level at its item size
    pub fn sprite_pool(&mut self, level: &LevelConfig) -> SpritePool {
        SpritePool::resolve(&mut self.assets, level.item_size)
    }

    /// Resolved music file for a level's stage, if it has one on disk
    pub fn stage_track(&mut self, level: &LevelConfig, stage: usize) -> Option<PathBuf> {
        let sound = level.backgrounds.get(stage)?.sound.as_deref()?;
        self.assets.sound(sound)
    }

    /// Stop audio and report what was missing
    pub fn shutdown(mut self) {
        self.audio.stop();
        let missing = self.assets.missing_count();
        if missing > 0 {
            log::info!("{missing} asset(s) were missing and drawn as placeholders");
        }
        log::info!("Shut down");
    }
}
