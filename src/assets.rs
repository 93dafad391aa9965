//! Sprite and sound lookup with placeholder fallback
//!
//! The simulation never touches the filesystem. Sprites are resolved once at
//! level start into shared handles; a missing file becomes a placeholder and is
//! reported once.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use serde::{Serialize, Serializer};

/// Item art pools (5 good / 5 bad)
pub const GOOD_ITEM_FILES: [&str; 5] = [
    "good1.png",
    "good2.png",
    "good3.png",
    "good4.png",
    "good5.png",
];
pub const BAD_ITEM_FILES: [&str; 5] = [
    "bad1.png", "bad2.png", "bad3.png", "bad4.png", "bad5.png",
];

/// An image that exists on disk, scaled to `size` by the renderer
#[derive(Debug, PartialEq)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub size: Vec2,
}

/// Sprite reference handed to entities
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Sprite {
    Image(Arc<ImageAsset>),
    /// Draw a solid shape instead
    #[default]
    Placeholder,
}

impl Sprite {
    pub fn is_image(&self) -> bool {
        matches!(self, Sprite::Image(_))
    }
}

impl Serialize for Sprite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sprite::Image(img) => serializer.serialize_some(&img.path),
            Sprite::Placeholder => serializer.serialize_none(),
        }
    }
}

/// Path-keyed cache rooted at the asset directory
#[derive(Debug, Default)]
pub struct AssetCache {
    root: PathBuf,
    sprites: HashMap<(String, [u32; 2]), Sprite>,
    warned: HashSet<String>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sprites: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    /// Resolve a sprite at a given size; missing files give a placeholder
    pub fn sprite(&mut self, path: &str, size: Vec2) -> Sprite {
        let key = (path.to_string(), [size.x as u32, size.y as u32]);
        if let Some(sprite) = self.sprites.get(&key) {
            return sprite.clone();
        }
        let sprite = match self.locate(path) {
            Some(full) => Sprite::Image(Arc::new(ImageAsset { path: full, size })),
            None => Sprite::Placeholder,
        };
        self.sprites.insert(key, sprite.clone());
        sprite
    }

    /// Full path of a sound file, if present
    pub fn sound(&mut self, path: &str) -> Option<PathBuf> {
        self.locate(path)
    }

    fn locate(&mut self, path: &str) -> Option<PathBuf> {
        if path.is_empty() {
            return None;
        }
        let full = self.root.join(path);
        if full.is_file() {
            Some(full)
        } else {
            if self.warned.insert(path.to_string()) {
                log::warn!("Asset missing: {} (using placeholder)", full.display());
            }
            None
        }
    }

    /// Number of distinct missing assets reported so far
    pub fn missing_count(&self) -> usize {
        self.warned.len()
    }
}

/// Item sprites resolved for one level
#[derive(Debug, Clone, Default)]
pub struct SpritePool {
    pub good: Vec<Sprite>,
    pub bad: Vec<Sprite>,
}

impl SpritePool {
    pub fn resolve(cache: &mut AssetCache, item_size: Vec2) -> Self {
        Self {
            good: GOOD_ITEM_FILES.iter().map(|p| cache.sprite(p, item_size)).collect(),
            bad: BAD_ITEM_FILES.iter().map(|p| cache.sprite(p, item_size)).collect(),
        }
    }

    /// Pool for one side; may be empty
    pub fn for_tag(&self, good: bool) -> &[Sprite] {
        if good { &self.good } else { &self.bad }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset_is_placeholder_and_warned_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AssetCache::new(dir.path());

        let size = Vec2::new(50.0, 50.0);
        assert_eq!(cache.sprite("good1.png", size), Sprite::Placeholder);
        assert_eq!(cache.sprite("good1.png", size), Sprite::Placeholder);
        assert!(cache.sound("bg_40.mp3").is_none());
        assert!(cache.sound("bg_40.mp3").is_none());
        assert_eq!(cache.missing_count(), 2);
    }

    #[test]
    fn test_present_asset_is_shared() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad3.png"), b"png").unwrap();
        let mut cache = AssetCache::new(dir.path());

        let size = Vec2::new(70.0, 70.0);
        let a = cache.sprite("bad3.png", size);
        let b = cache.sprite("bad3.png", size);
        match (&a, &b) {
            (Sprite::Image(x), Sprite::Image(y)) => {
                assert!(Arc::ptr_eq(x, y));
                assert_eq!(x.size, size);
            }
            _ => panic!("expected image sprites"),
        }

        let pool = SpritePool::resolve(&mut cache, size);
        assert_eq!(pool.bad.iter().filter(|s| s.is_image()).count(), 1);
        assert_eq!(pool.good.len(), 5);
    }

    #[test]
    fn test_empty_path_is_silent() {
        let mut cache = AssetCache::new("does-not-exist");
        assert!(cache.sound("").is_none());
        assert_eq!(cache.missing_count(), 0);
    }
}
