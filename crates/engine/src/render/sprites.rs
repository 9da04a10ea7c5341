use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::warn;

use super::surface::SpriteImage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Sprite keys are relative, lowercase paths without extension, e.g. `ships/scout`.
pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

/// Lazily decoded PNG sprites under `<assets>/sprites`. Failed loads are cached
/// as misses and warned about once per key.
#[derive(Debug)]
pub struct SpriteCache {
    sprite_root: PathBuf,
    loaded: HashMap<String, Option<SpriteImage>>,
    warned_keys: HashSet<String>,
}

impl SpriteCache {
    pub fn new(assets_dir: &Path) -> Self {
        Self {
            sprite_root: assets_dir.join("sprites"),
            loaded: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&SpriteImage> {
        if !self.loaded.contains_key(key) {
            let sprite = match self.resolve_path(key) {
                Ok(path) => match load_sprite_rgba(&path) {
                    Ok(sprite) => Some(sprite),
                    Err(reason) => {
                        self.warn_once(key, Some(&path), &reason);
                        None
                    }
                },
                Err(error) => {
                    self.warn_once(key, None, &format!("invalid_key:{error}"));
                    None
                }
            };
            self.loaded.insert(key.to_string(), sprite);
        }
        self.loaded.get(key).and_then(Option::as_ref)
    }

    /// Drops decoded images so the next lookup re-reads from disk.
    pub fn clear(&mut self) {
        self.loaded.clear();
        self.warned_keys.clear();
    }

    pub fn len(&self) -> usize {
        self.loaded.values().filter(|sprite| sprite.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve_path(&self, key: &str) -> Result<PathBuf, SpriteKeyError> {
        validate_sprite_key(key)?;
        Ok(self.sprite_root.join(format!("{key}.png")))
    }

    fn warn_once(&mut self, key: &str, path: Option<&Path>, reason: &str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        let path_display = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        warn!(
            sprite_key = key,
            path = %path_display,
            reason,
            "sprite_load_failed_using_placeholder"
        );
    }
}

fn load_sprite_rgba(path: &Path) -> Result<SpriteImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(SpriteImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["player", "ships/scout_2", "a-b/c_d"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "A", "a.png"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn loads_png_and_caches_misses() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sprite_dir = temp.path().join("sprites").join("ships");
        std::fs::create_dir_all(&sprite_dir).expect("sprite dir");
        let mut png = image::RgbaImage::new(3, 2);
        png.put_pixel(1, 1, image::Rgba([9, 8, 7, 255]));
        png.save(sprite_dir.join("scout.png")).expect("save png");

        let mut cache = SpriteCache::new(temp.path());
        let sprite = cache.get("ships/scout").expect("sprite").clone();
        assert_eq!((sprite.width, sprite.height), (3, 2));
        let offset = (3 + 1) * 4;
        assert_eq!(&sprite.rgba[offset..offset + 4], &[9, 8, 7, 255]);

        assert!(cache.get("ships/missing").is_none());
        assert!(cache.get("Bad Key").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
