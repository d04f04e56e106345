//! # CARDIO Demo
//!
//! Headless run of the whole substrate:
//!
//! 1. Builds the pools and mixer from config (built-in defaults without one)
//! 2. Generates a heart sprite sheet, a HUD font and a click sound, writes
//!    them through the codecs and loads them back through the catalog
//! 3. Renders frames at a simulated 60 Hz with a beat every half second,
//!    while an audio thread mixes the clicks in step with the frames
//! 4. Writes the last frame as `.pam` and the mix as `.af32`
//!
//! ```bash
//! cardio_demo --out demo_out --frames 240
//! RUST_LOG=debug cardio_demo --config cardio.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cardio::assets::pixel::{rgba, to_file_order, BLACK, WHITE};
use cardio::assets::{write_image_file, write_sound_file, Image, Sound};
use cardio::audio::Mixer;
use cardio::memory::Pool;
use cardio::render::{AnimatedImage, Canvas, Font, Hold, GLYPH_COUNT};
use cardio::{
    AssetCatalog, AssetManifest, CardioConfig, CardioError, CardioResult, FontEntry, FrameClock,
    LoadPolicy, SoundEntry, SoundFormat, SpriteEntry, FRAME_PERIOD,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Heart sprite: frames of `HEART_SIZE x HEART_SIZE`.
const HEART_SIZE: usize = 24;
const HEART_FRAMES: usize = 4;

/// HUD glyph size.
const GLYPH_WIDTH: usize = 4;
const GLYPH_HEIGHT: usize = 6;

/// 120 BPM.
const BEAT_MS: u64 = 500;

/// Stereo frames per simulated device callback.
const PERIOD_FRAMES: usize = 512;

/// Sample rate the click is generated at.
const CLICK_RATE: f32 = 48_000.0;

#[derive(Parser)]
#[command(name = "cardio_demo")]
#[command(version, about = "Headless CARDIO runtime demo", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated assets and output
    #[arg(short, long, default_value = "cardio_out")]
    out: PathBuf,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 180)]
    frames: u64,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    if let Err(error) = run(&cli) {
        tracing::error!(%error, "demo failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CardioResult<()> {
    let clock = FrameClock::new();
    let config = match &cli.config {
        Some(path) => CardioConfig::from_file(path)?,
        None => CardioConfig::default(),
    };
    std::fs::create_dir_all(&cli.out)?;

    let mut pools = config.memory.initialize()?;
    let (width, height) = (config.video.width, config.video.height);
    let framebuffer = allocate_pixels(&pools.persistent, width * height)?;

    generate_assets(&pools.frame, &cli.out)?;
    pools.frame.flush();

    let catalog = AssetCatalog::load(&pools.scene, &demo_manifest(), &cli.out, LoadPolicy::Startup)?;
    if let Some(path) = cli.config.as_deref().filter(|_| !config.assets.is_empty()) {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let configured = AssetCatalog::load(&pools.scene, &config.assets, base, LoadPolicy::Lazy)?;
        tracing::info!(
            loaded = configured.len(),
            skipped = configured.skipped().len(),
            "configured assets"
        );
    }

    let missing = |name: &str| CardioError::Missing(name.to_owned());
    let mut heart = catalog.sprite("heart").ok_or_else(|| missing("heart"))?;
    let font = catalog.font("hud").ok_or_else(|| missing("hud"))?;
    let click = catalog.sound("click").ok_or_else(|| missing("click"))?;

    tracing::debug!(
        samples = click.sample_count(),
        duration_ms = click.duration_ms(config.audio.sample_rate),
        "click loaded"
    );

    let mixer = config.audio.create_mixer()?;
    let sample_rate = u64::from(config.audio.sample_rate);
    let frame_ms = u64::try_from(FRAME_PERIOD.as_millis()).unwrap_or(16);
    let run_ms = cli.frames * frame_ms;
    let total_frames = usize::try_from(run_ms * sample_rate / 1000).unwrap_or(0);
    let mut mixed = vec![0.0f32; total_frames * 2];

    let mut canvas = Canvas::new(framebuffer, width, height).ok_or(CardioError::Layout("framebuffer"))?;
    let rendered_ms = AtomicU64::new(0);
    let rendering = AtomicBool::new(true);

    std::thread::scope(|scope| {
        scope.spawn(|| record(&mixer, &mut mixed, sample_rate, &rendered_ms, &rendering));

        let mut pending = None;
        let mut beats = 0u64;
        for frame in 0..cli.frames {
            let now = frame * frame_ms;
            pools.frame.flush();

            // Arm the click one frame ahead so it starts exactly on the beat.
            if (now + frame_ms) % BEAT_MS < frame_ms {
                pending = mixer.queue(&click, 1.0, 0.7, false);
            }
            if now % BEAT_MS < frame_ms {
                if let Some(channel) = pending.take() {
                    mixer.play_channel(channel);
                }
                heart.restart(now);
                beats += 1;
            }

            draw_frame(&mut canvas, &pools.frame, &heart, &font, now, beats);
            rendered_ms.store(now + frame_ms, Ordering::Release);
        }
        rendering.store(false, Ordering::Release);
    });

    pools.frame.flush();
    write_frame(&canvas, &pools.frame, &cli.out.join("last_frame.pam"))?;
    write_sound_file(&Sound::new(&mixed), cli.out.join("mix.af32"))?;

    tracing::info!(
        frames = cli.frames,
        simulated_ms = run_ms,
        wall_ms = clock.now_ms(),
        out = %cli.out.display(),
        "demo finished"
    );
    pools.log_stats();
    Ok(())
}

fn allocate_pixels(pool: &Pool, count: usize) -> CardioResult<&mut [u32]> {
    pool.allocate_slice::<u32>(count).ok_or(CardioError::Exhausted {
        pool: pool.id(),
        requested: count.saturating_mul(4),
    })
}

/// Audio thread: mixes one period once rendering has passed its end time.
/// After rendering stops the remaining periods mix straight through.
fn record(mixer: &Mixer<'_>, out: &mut [f32], sample_rate: u64, rendered_ms: &AtomicU64, rendering: &AtomicBool) {
    let mut frames_done = 0u64;
    for period in out.chunks_mut(PERIOD_FRAMES * 2) {
        let frames = period.len() as u64 / 2;
        let period_end_ms = (frames_done + frames) * 1000 / sample_rate.max(1);
        while rendering.load(Ordering::Acquire) && rendered_ms.load(Ordering::Acquire) < period_end_ms {
            std::thread::yield_now();
        }
        mixer.mix(period);
        frames_done += frames;
    }
}

fn draw_frame(
    canvas: &mut Canvas<'_>,
    scratch: &Pool,
    heart: &AnimatedImage<'_>,
    font: &Font<'_>,
    now: u64,
    beats: u64,
) {
    let width = i32::try_from(canvas.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(canvas.height()).unwrap_or(i32::MAX);
    let size = i32::try_from(HEART_SIZE).unwrap_or(0);

    canvas.clear(BLACK);

    // Beat bar: fills across the screen over one beat.
    let phase = i32::try_from((now % BEAT_MS) * u64::try_from(width).unwrap_or(0) / BEAT_MS).unwrap_or(0);
    canvas.draw_line(0, height - 4, phase, height - 4, rgba(255, 64, 96, 255));
    canvas.draw_line(0, height - 1, width - 1, height - 1, rgba(64, 64, 64, 255));

    let centre = ((width - size) / 2, (height - size) / 2);
    let settled = canvas.draw_animated_frames_and_wait(heart, 0, HEART_FRAMES - 1, centre.0, centre.1, now);

    // A row of small looping hearts, positions in frame-pool scratch.
    if let Some(offsets) = scratch.allocate_slice::<i32>(4) {
        for (index, offset) in (0i32..).zip(offsets.iter_mut()) {
            *offset = 16 + index * (size + 8);
        }
        for &x in offsets.iter() {
            canvas.draw_animated(heart, x, 16, now + u64::from(x.unsigned_abs()) * 7);
        }
    }

    let status = if settled == Some(Hold::Holding) { "REST" } else { "BEAT" };
    canvas.draw_text(font, 4, 4, WHITE, format_args!("{status} {beats:04}  T {now:06}"));
}

/// Writes the canvas as `.pam`, reordering a scratch copy into file order.
fn write_frame(canvas: &Canvas<'_>, scratch: &Pool, path: &Path) -> CardioResult<()> {
    let copy = scratch.clone_slice(canvas.pixels()).ok_or(CardioError::Exhausted {
        pool: scratch.id(),
        requested: canvas.pixels().len() * 4,
    })?;
    for pixel in copy.iter_mut() {
        *pixel = to_file_order(*pixel);
    }
    let image = Image::new(copy, canvas.width(), canvas.height()).ok_or(CardioError::Layout("frame copy"))?;
    write_image_file(&image, path)?;
    Ok(())
}

fn demo_manifest() -> AssetManifest {
    AssetManifest {
        directory: PathBuf::new(),
        images: Vec::new(),
        sprites: vec![SpriteEntry {
            name: "heart".to_owned(),
            file: PathBuf::from("heart.pam"),
            frame_count: HEART_FRAMES,
            frame_duration_ms: 60,
            frame_width: None,
            frame_height: None,
        }],
        fonts: vec![FontEntry {
            name: "hud".to_owned(),
            file: PathBuf::from("hud.pam"),
            char_width: GLYPH_WIDTH,
            char_height: GLYPH_HEIGHT,
        }],
        sounds: vec![SoundEntry {
            name: "click".to_owned(),
            file: PathBuf::from("click.af32"),
            format: SoundFormat::Af32,
        }],
    }
}

/// Generates the demo assets in `scratch` and writes them under `directory`.
#[allow(clippy::cast_precision_loss)]
fn generate_assets(scratch: &Pool, directory: &Path) -> CardioResult<()> {
    // Heart sheet: each frame a filled disc, largest on the beat.
    let sheet = allocate_pixels(scratch, HEART_SIZE * HEART_SIZE * HEART_FRAMES)?;
    let centre = HEART_SIZE / 2;
    for (frame, pixels) in sheet.chunks_exact_mut(HEART_SIZE * HEART_SIZE).enumerate() {
        let radius = centre - frame * 2;
        for (index, pixel) in pixels.iter_mut().enumerate() {
            let (x, y) = (index % HEART_SIZE, index / HEART_SIZE);
            let distance = x.abs_diff(centre).pow(2) + y.abs_diff(centre).pow(2);
            *pixel = if distance < radius * radius {
                to_file_order(rgba(220, 20, 60, 255))
            } else {
                0
            };
        }
    }
    let sheet = Image::new(sheet, HEART_SIZE, HEART_SIZE * HEART_FRAMES).ok_or(CardioError::Layout("heart sheet"))?;
    write_image_file(&sheet, directory.join("heart.pam"))?;

    // Font strip: each glyph a pattern taken from the bits of its code.
    let strip_width = GLYPH_WIDTH * GLYPH_COUNT;
    let strip = allocate_pixels(scratch, strip_width * GLYPH_HEIGHT)?;
    for (index, pixel) in strip.iter_mut().enumerate() {
        let (x, y) = (index % strip_width, index / strip_width);
        let code = x / GLYPH_WIDTH + 0x20;
        let bit = (x % GLYPH_WIDTH + y * GLYPH_WIDTH) % 8;
        let lit = code != 0x20 && y < GLYPH_HEIGHT - 1 && (code >> bit) & 1 == 1;
        *pixel = if lit { to_file_order(WHITE) } else { 0 };
    }
    let strip = Image::new(strip, strip_width, GLYPH_HEIGHT).ok_or(CardioError::Layout("font strip"))?;
    write_image_file(&strip, directory.join("hud.pam"))?;

    // Click: 40 ms decaying 1 kHz tone.
    let count = 1_920;
    let samples = scratch.allocate_slice::<f32>(count).ok_or(CardioError::Exhausted {
        pool: scratch.id(),
        requested: count * 4,
    })?;
    for (index, sample) in samples.iter_mut().enumerate() {
        let t = index as f32 / CLICK_RATE;
        *sample = (t * 1_000.0 * std::f32::consts::TAU).sin() * (-t * 80.0).exp();
    }
    write_sound_file(&Sound::new(samples), directory.join("click.af32"))?;

    tracing::info!(directory = %directory.display(), "demo assets generated");
    Ok(())
}
