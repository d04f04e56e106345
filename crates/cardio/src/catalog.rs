//! # Asset Catalog
//!
//! Decodes every entry of an [`AssetManifest`] into one pool and indexes the
//! results by name. The catalog borrows the pool, so flushing the pool
//! (a scene change) first requires dropping the catalog.
//!
//! ## Load Policies
//!
//! | Policy    | On a failing entry                      |
//! |-----------|-----------------------------------------|
//! | `Startup` | stop and return the error               |
//! | `Lazy`    | log a warning, skip the entry, continue |

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cardio_assets::{read_image_file, read_raw_sound_file, read_sound_file, AssetError, Image, Sound};
use cardio_core::Pool;
use cardio_render::{AnimatedImage, Font};

use crate::config::{AssetManifest, FontEntry, SoundFormat, SpriteEntry};
use crate::error::{CatalogError, CatalogResult};

/// What to do when a manifest entry fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Every asset is required; the first failure aborts the load.
    #[default]
    Startup,
    /// Failures are logged and the entry is left out.
    Lazy,
}

/// Decoded assets, by name.
#[derive(Debug, Default)]
pub struct AssetCatalog<'p> {
    images: HashMap<String, Image<'p>>,
    sprites: HashMap<String, AnimatedImage<'p>>,
    fonts: HashMap<String, Font<'p>>,
    sounds: HashMap<String, Sound<'p>>,
    skipped: Vec<String>,
}

impl<'p> AssetCatalog<'p> {
    /// Loads every entry of `manifest` into `pool`.
    ///
    /// Entry files resolve against `base_dir.join(&manifest.directory)`.
    /// Sprites start their animation at time zero.
    ///
    /// # Errors
    ///
    /// Under [`LoadPolicy::Startup`], the first [`CatalogError`]. Under
    /// [`LoadPolicy::Lazy`], only [`CatalogError::Duplicate`].
    pub fn load(
        pool: &'p Pool,
        manifest: &AssetManifest,
        base_dir: &Path,
        policy: LoadPolicy,
    ) -> CatalogResult<Self> {
        let directory = base_dir.join(&manifest.directory);
        let mut catalog = Self::default();

        for entry in &manifest.images {
            let path = directory.join(&entry.file);
            let loaded = read_image_file(&path, pool).map_err(|source| decode_error(&entry.name, &path, source));
            catalog.admit(policy, &entry.name, loaded, |catalog, image| {
                insert(&mut catalog.images, &entry.name, image)
            })?;
        }
        for entry in &manifest.sprites {
            let loaded = load_sprite(entry, &directory, pool);
            catalog.admit(policy, &entry.name, loaded, |catalog, sprite| {
                insert(&mut catalog.sprites, &entry.name, sprite)
            })?;
        }
        for entry in &manifest.fonts {
            let loaded = load_font(entry, &directory, pool);
            catalog.admit(policy, &entry.name, loaded, |catalog, font| {
                insert(&mut catalog.fonts, &entry.name, font)
            })?;
        }
        for entry in &manifest.sounds {
            let path = directory.join(&entry.file);
            let loaded = match entry.format {
                SoundFormat::Af32 => read_sound_file(&path, pool),
                SoundFormat::Raw => read_raw_sound_file(&path, pool),
            }
            .map_err(|source| decode_error(&entry.name, &path, source));
            catalog.admit(policy, &entry.name, loaded, |catalog, sound| {
                insert(&mut catalog.sounds, &entry.name, sound)
            })?;
        }

        tracing::info!(
            directory = %directory.display(),
            loaded = catalog.len(),
            skipped = catalog.skipped.len(),
            pool = %pool.id(),
            pool_filled = pool.filled(),
            "asset catalog loaded"
        );
        Ok(catalog)
    }

    /// Stores a loaded asset or applies the policy to a failure.
    fn admit<T>(
        &mut self,
        policy: LoadPolicy,
        name: &str,
        loaded: CatalogResult<T>,
        store: impl FnOnce(&mut Self, T) -> CatalogResult<()>,
    ) -> CatalogResult<()> {
        match (loaded, policy) {
            (Ok(asset), _) => store(self, asset),
            (Err(error), LoadPolicy::Startup) => Err(error),
            (Err(error), LoadPolicy::Lazy) => {
                tracing::warn!(asset = name, %error, "skipping asset");
                self.skipped.push(name.to_owned());
                Ok(())
            }
        }
    }

    /// Returns the image called `name`.
    #[must_use]
    pub fn image(&self, name: &str) -> Option<Image<'p>> {
        self.images.get(name).copied()
    }

    /// Returns the sprite called `name`, animation anchored at time zero.
    #[must_use]
    pub fn sprite(&self, name: &str) -> Option<AnimatedImage<'p>> {
        self.sprites.get(name).copied()
    }

    /// Returns the font called `name`.
    #[must_use]
    pub fn font(&self, name: &str) -> Option<Font<'p>> {
        self.fonts.get(name).copied()
    }

    /// Returns the sound called `name`.
    #[must_use]
    pub fn sound(&self, name: &str) -> Option<Sound<'p>> {
        self.sounds.get(name).copied()
    }

    /// Names of entries left out under [`LoadPolicy::Lazy`].
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Number of loaded assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len() + self.sprites.len() + self.fonts.len() + self.sounds.len()
    }

    /// Returns `true` if nothing loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stores `asset` under `name`; an existing asset of that name is kept.
fn insert<T>(map: &mut HashMap<String, T>, name: &str, asset: T) -> CatalogResult<()> {
    match map.entry(name.to_owned()) {
        Entry::Occupied(_) => Err(CatalogError::Duplicate(name.to_owned())),
        Entry::Vacant(slot) => {
            slot.insert(asset);
            Ok(())
        }
    }
}


fn decode_error(name: &str, path: &Path, source: AssetError) -> CatalogError {
    CatalogError::Decode {
        name: name.to_owned(),
        path: path.to_path_buf(),
        source,
    }
}

fn layout_error(name: &str, path: PathBuf, detail: &'static str) -> CatalogError {
    CatalogError::Layout {
        name: name.to_owned(),
        path,
        detail,
    }
}

fn load_sprite<'p>(entry: &SpriteEntry, directory: &Path, pool: &'p Pool) -> CatalogResult<AnimatedImage<'p>> {
    let path = directory.join(&entry.file);
    let sheet = read_image_file(&path, pool).map_err(|source| decode_error(&entry.name, &path, source))?;

    let sprite = match (entry.frame_width, entry.frame_height) {
        (None, None) => AnimatedImage::new(sheet, entry.frame_count, entry.frame_duration_ms, 0),
        (width, height) => AnimatedImage::with_frame_size(
            sheet,
            width.unwrap_or(sheet.width()),
            height.unwrap_or(sheet.height() / entry.frame_count.max(1)),
            entry.frame_count,
            entry.frame_duration_ms,
            0,
        ),
    };
    sprite.ok_or_else(|| layout_error(&entry.name, path, "sheet is too small for its frames"))
}

fn load_font<'p>(entry: &FontEntry, directory: &Path, pool: &'p Pool) -> CatalogResult<Font<'p>> {
    let path = directory.join(&entry.file);
    let strip = read_image_file(&path, pool).map_err(|source| decode_error(&entry.name, &path, source))?;
    Font::new(strip, entry.char_width, entry.char_height)
        .ok_or_else(|| layout_error(&entry.name, path, "strip is too small for 95 glyphs"))
}
