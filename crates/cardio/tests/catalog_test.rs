//! Integration test for loading a manifest through the codecs.

use std::path::{Path, PathBuf};

use cardio::assets::pixel::{rgba, to_file_order, WHITE};
use cardio::assets::{write_image_file, write_sound_file, Image, Sound};
use cardio::memory::{Pool, PoolId};
use cardio::render::GLYPH_COUNT;
use cardio::{
    AssetCatalog, AssetManifest, CardioConfig, CatalogError, LoadPolicy, SoundFormat,
};

fn temp_dir(name: &str) -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("cardio_{id}_{name}"));
    std::fs::create_dir_all(dir.join("assets")).unwrap();
    dir
}

fn write_assets(dir: &Path) {
    let assets = dir.join("assets");

    // 1x4 sheet, four frames of one pixel.
    let sheet: Vec<u32> = (1..=4u8).map(|n| to_file_order(rgba(n, 0, 0, 255))).collect();
    write_image_file(&Image::new(&sheet, 1, 4).unwrap(), assets.join("pulse.pam")).unwrap();

    let strip = vec![to_file_order(WHITE); GLYPH_COUNT * 2];
    write_image_file(&Image::new(&strip, GLYPH_COUNT, 2).unwrap(), assets.join("font.pam")).unwrap();

    write_sound_file(&Sound::new(&[0.5, 0.25]), assets.join("beat.af32")).unwrap();
    let raw: Vec<u8> = [1.0f32, -1.0, 0.5].iter().flat_map(|s| s.to_ne_bytes()).collect();
    std::fs::write(assets.join("hum.f32"), raw).unwrap();
}

const MANIFEST: &str = r#"
[assets]
directory = "assets"

[[assets.images]]
name = "backdrop"
file = "pulse.pam"

[[assets.sprites]]
name = "pulse"
file = "pulse.pam"
frame_count = 4
frame_duration_ms = 100

[[assets.fonts]]
name = "hud"
file = "font.pam"
char_width = 1
char_height = 2

[[assets.sounds]]
name = "beat"
file = "beat.af32"

[[assets.sounds]]
name = "hum"
file = "hum.f32"
format = "raw"
"#;

fn manifest() -> AssetManifest {
    CardioConfig::from_toml_str(MANIFEST).unwrap().assets
}

#[test]
fn test_startup_load_decodes_every_kind() {
    let dir = temp_dir("startup");
    write_assets(&dir);
    let pool = Pool::with_capacity(PoolId::Scene, 1 << 16).unwrap();

    let catalog = AssetCatalog::load(&pool, &manifest(), &dir, LoadPolicy::Startup).unwrap();
    assert_eq!(catalog.len(), 5);
    assert!(catalog.skipped().is_empty());

    assert_eq!(catalog.image("backdrop").unwrap().height(), 4);
    let pulse = catalog.sprite("pulse").unwrap();
    assert_eq!(pulse.frame_count(), 4);
    assert_eq!(pulse.frame(pulse.looping_frame(250)).unwrap().pixels(), &[rgba(3, 0, 0, 255)]);
    assert_eq!(catalog.font("hud").unwrap().char_height(), 2);
    assert_eq!(catalog.sound("beat").unwrap().samples(), &[0.5, 0.25]);
    assert_eq!(catalog.sound("hum").unwrap().sample_count(), 3);
    assert!(catalog.sound("missing").is_none());
    assert!(pool.filled() > 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_startup_load_stops_on_missing_file() {
    let dir = temp_dir("strict");
    write_assets(&dir);
    std::fs::remove_file(dir.join("assets").join("beat.af32")).unwrap();
    let pool = Pool::with_capacity(PoolId::Scene, 1 << 16).unwrap();

    let error = AssetCatalog::load(&pool, &manifest(), &dir, LoadPolicy::Startup).unwrap_err();
    assert_eq!(error.name(), "beat");
    assert!(matches!(error, CatalogError::Decode { ref source, .. } if source.is_decode_failure()));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_lazy_load_skips_failures() {
    let dir = temp_dir("lazy");
    write_assets(&dir);
    std::fs::write(dir.join("assets").join("font.pam"), b"P6\n").unwrap();
    let pool = Pool::with_capacity(PoolId::Scene, 1 << 16).unwrap();

    let mut manifest = manifest();
    manifest.sounds[1].format = SoundFormat::Af32;

    let catalog = AssetCatalog::load(&pool, &manifest, &dir, LoadPolicy::Lazy).unwrap();
    assert_eq!(catalog.skipped(), &["hud".to_owned(), "hum".to_owned()]);
    assert!(catalog.font("hud").is_none());
    assert!(catalog.sound("beat").is_some());
    assert_eq!(catalog.len(), 3);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_sprite_layout_mismatch() {
    let dir = temp_dir("layout");
    write_assets(&dir);
    let pool = Pool::with_capacity(PoolId::Scene, 1 << 16).unwrap();

    let mut manifest = manifest();
    manifest.sprites[0].frame_count = 8;

    let error = AssetCatalog::load(&pool, &manifest, &dir, LoadPolicy::Startup).unwrap_err();
    assert!(matches!(error, CatalogError::Layout { .. }));

    std::fs::remove_dir_all(&dir).ok();
}
