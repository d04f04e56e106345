//! Integration test for drawing into a pool-backed framebuffer.

use cardio_assets::pixel::{rgba, BLACK};
use cardio_assets::{decode_image, Image};
use cardio_core::MemoryPools;
use cardio_render::{AnimatedImage, Canvas, Hold, SCREEN_HEIGHT, SCREEN_WIDTH};

const RED: u32 = rgba(255, 0, 0, 255);

fn pools() -> MemoryPools {
    MemoryPools::initialize(1 << 20, 1 << 18, 1 << 16).unwrap()
}

#[test]
fn test_alpha_tested_blit_changes_only_opaque_pixels() {
    let pools = pools();
    let framebuffer = pools
        .persistent
        .allocate_slice::<u32>(SCREEN_WIDTH * SCREEN_HEIGHT)
        .unwrap();
    let mut canvas = Canvas::screen(framebuffer).unwrap();
    canvas.clear(BLACK);

    // 2x2 with alpha 255, 0, 255, 0.
    let sprite = [RED, rgba(0, 255, 0, 0), RED, rgba(0, 0, 255, 0)];
    canvas.draw_image(&Image::new(&sprite, 2, 2).unwrap(), 10, 10);

    let changed = canvas.pixels().iter().filter(|&&pixel| pixel != BLACK).count();
    assert_eq!(changed, 2);
    assert_eq!(canvas.pixel(10, 10), Some(RED));
    assert_eq!(canvas.pixel(11, 10), Some(BLACK));
    assert_eq!(canvas.pixel(10, 11), Some(RED));
    assert_eq!(canvas.pixel(11, 11), Some(BLACK));
}

#[test]
fn test_decoded_sheet_animates_on_canvas() {
    let pools = pools();

    // Three 1x1 frames stacked vertically, file bytes R G B A.
    let mut file =
        b"P7\nWIDTH 1\nHEIGHT 3\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n".to_vec();
    file.extend_from_slice(&[10, 0, 0, 255, 20, 0, 0, 255, 30, 0, 0, 255]);
    let sheet = decode_image(&mut file.as_slice(), &pools.scene).unwrap();
    let sprite = AnimatedImage::new(sheet, 3, 100, 1_000).unwrap();

    let mut framebuffer = vec![0u32; 4];
    let mut canvas = Canvas::new(&mut framebuffer, 2, 2).unwrap();

    let mut shown = Vec::new();
    for now in [1_000, 1_150, 1_250, 1_300] {
        let hold = canvas.draw_animated_frames_and_wait(&sprite, 0, 2, 0, 0, now).unwrap();
        shown.push((canvas.pixel(0, 0).unwrap(), hold));
    }
    assert_eq!(
        shown,
        vec![
            (rgba(10, 0, 0, 255), Hold::Advancing),
            (rgba(20, 0, 0, 255), Hold::Advancing),
            (rgba(30, 0, 0, 255), Hold::Advancing),
            (rgba(30, 0, 0, 255), Hold::Holding),
        ]
    );
}
