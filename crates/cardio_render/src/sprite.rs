//! # Animated Sprites
//!
//! A sprite sheet is one image holding `frame_count` equally sized frames
//! stacked vertically. Which frame to show is a pure function of the
//! current time and the animation's start time:
//!
//! ```text
//! frames_elapsed = (now - start) / frame_duration
//!
//! loop            frame = frames_elapsed % frame_count
//! ranged loop     frame = first + frames_elapsed % (last - first + 1)
//! play and hold   frame = min(first + frames_elapsed, last)
//! ```
//!
//! A frame duration of zero never advances. A `now` earlier than the start
//! time counts as no time elapsed.

use cardio_assets::Image;

use crate::raster::Canvas;

/// Progress of a play-once-and-hold animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hold {
    /// Still stepping towards the last frame of the range.
    Advancing,
    /// Past the end of the range; the last frame is held.
    Holding,
}

impl Hold {
    /// Returns `true` once the last frame is being held.
    #[inline]
    #[must_use]
    pub const fn is_holding(self) -> bool {
        matches!(self, Hold::Holding)
    }
}

/// A vertically stacked sprite sheet with frame timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimatedImage<'a> {
    pixels: &'a [u32],
    frame_width: usize,
    frame_height: usize,
    frame_count: usize,
    frame_duration_ms: u64,
    start_time_ms: u64,
}

impl<'a> AnimatedImage<'a> {
    /// Splits `sheet` into `frame_count` full-width frames of equal height.
    ///
    /// Rows left over after an uneven split are never shown.
    ///
    /// # Returns
    ///
    /// `None` if `frame_count` is zero or exceeds the sheet height.
    #[must_use]
    pub fn new(
        sheet: Image<'a>,
        frame_count: usize,
        frame_duration_ms: u64,
        start_time_ms: u64,
    ) -> Option<Self> {
        let frame_height = sheet.height().checked_div(frame_count)?;
        Self::with_frame_size(
            sheet,
            sheet.width(),
            frame_height,
            frame_count,
            frame_duration_ms,
            start_time_ms,
        )
    }

    /// Reinterprets the sheet's pixels as `frame_count` consecutive frames
    /// of `frame_width x frame_height`.
    ///
    /// # Returns
    ///
    /// `None` if any dimension is zero or the frames need more pixels than
    /// the sheet holds.
    #[must_use]
    pub fn with_frame_size(
        sheet: Image<'a>,
        frame_width: usize,
        frame_height: usize,
        frame_count: usize,
        frame_duration_ms: u64,
        start_time_ms: u64,
    ) -> Option<Self> {
        let needed = frame_width
            .checked_mul(frame_height)?
            .checked_mul(frame_count)?;
        if needed == 0 || needed > sheet.pixels().len() {
            return None;
        }
        Some(Self {
            pixels: sheet.pixels(),
            frame_width,
            frame_height,
            frame_count,
            frame_duration_ms,
            start_time_ms,
        })
    }

    /// Width of one frame in pixels.
    #[inline]
    #[must_use]
    pub const fn frame_width(&self) -> usize {
        self.frame_width
    }

    /// Height of one frame in pixels.
    #[inline]
    #[must_use]
    pub const fn frame_height(&self) -> usize {
        self.frame_height
    }

    /// Number of frames in the sheet.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// How long each frame is shown.
    #[inline]
    #[must_use]
    pub const fn frame_duration_ms(&self) -> u64 {
        self.frame_duration_ms
    }

    /// When frame zero started.
    #[inline]
    #[must_use]
    pub const fn start_time_ms(&self) -> u64 {
        self.start_time_ms
    }

    /// Restarts the animation from frame zero at `now_ms`.
    #[inline]
    pub fn restart(&mut self, now_ms: u64) {
        self.start_time_ms = now_ms;
    }

    /// Returns frame `index` as an image, or `None` past the last frame.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Image<'a>> {
        if index >= self.frame_count {
            return None;
        }
        let size = self.frame_width * self.frame_height;
        let start = index * size;
        Image::new(&self.pixels[start..start + size], self.frame_width, self.frame_height)
    }

    /// Whole frame durations elapsed since the start time.
    #[inline]
    #[must_use]
    pub fn frames_elapsed(&self, now_ms: u64) -> u64 {
        now_ms
            .saturating_sub(self.start_time_ms)
            .checked_div(self.frame_duration_ms)
            .unwrap_or(0)
    }

    /// Frame shown by a full loop over the sheet.
    #[must_use]
    pub fn looping_frame(&self, now_ms: u64) -> usize {
        wrap(self.frames_elapsed(now_ms), self.frame_count)
    }

    /// Frame shown by a loop over `first..=last`, or `None` for a range that
    /// is empty or runs past the sheet.
    #[must_use]
    pub fn ranged_frame(&self, first: usize, last: usize, now_ms: u64) -> Option<usize> {
        self.check_range(first, last)?;
        Some(first + wrap(self.frames_elapsed(now_ms), last - first + 1))
    }

    /// Frame shown by a single pass over `first..=last` that then holds
    /// `last`, with whether it is holding yet.
    ///
    /// Holding starts once `first + frames_elapsed` passes `last`, which is
    /// one frame duration after `last` is first shown.
    #[must_use]
    pub fn ranged_hold_frame(&self, first: usize, last: usize, now_ms: u64) -> Option<(usize, Hold)> {
        self.check_range(first, last)?;
        let reached = u64::try_from(first)
            .ok()
            .and_then(|first| first.checked_add(self.frames_elapsed(now_ms)));
        match reached.and_then(|frame| usize::try_from(frame).ok()) {
            Some(frame) if frame <= last => Some((frame, Hold::Advancing)),
            _ => Some((last, Hold::Holding)),
        }
    }

    fn check_range(&self, first: usize, last: usize) -> Option<()> {
        (first <= last && last < self.frame_count).then_some(())
    }
}

/// `elapsed % count` for a non-zero `count`.
#[inline]
fn wrap(elapsed: u64, count: usize) -> usize {
    match u64::try_from(count) {
        // Remainder is below `count`, so it fits back in usize.
        Ok(count) if count > 0 => usize::try_from(elapsed % count).unwrap_or(0),
        _ => 0,
    }
}

impl Canvas<'_> {
    /// Draws the frame a full loop shows at `now_ms`.
    ///
    /// # Returns
    ///
    /// The frame index drawn.
    pub fn draw_animated(&mut self, sprite: &AnimatedImage<'_>, x: i32, y: i32, now_ms: u64) -> usize {
        let frame = sprite.looping_frame(now_ms);
        self.draw_animated_frame(sprite, frame, x, y);
        frame
    }

    /// Draws frame `frame` regardless of time.
    ///
    /// # Returns
    ///
    /// `false` if the frame does not exist; nothing is drawn then.
    pub fn draw_animated_frame(&mut self, sprite: &AnimatedImage<'_>, frame: usize, x: i32, y: i32) -> bool {
        match sprite.frame(frame) {
            Some(image) => {
                self.draw_image(&image, x, y);
                true
            }
            None => false,
        }
    }

    /// Draws the frame a loop over `first..=last` shows at `now_ms`.
    ///
    /// # Returns
    ///
    /// The frame index drawn, or `None` for an invalid range.
    pub fn draw_animated_frames(
        &mut self,
        sprite: &AnimatedImage<'_>,
        first: usize,
        last: usize,
        x: i32,
        y: i32,
        now_ms: u64,
    ) -> Option<usize> {
        let frame = sprite.ranged_frame(first, last, now_ms)?;
        self.draw_animated_frame(sprite, frame, x, y);
        Some(frame)
    }

    /// Draws a single pass over `first..=last`, holding `last` at the end.
    ///
    /// # Returns
    ///
    /// Whether the animation is holding, or `None` for an invalid range.
    pub fn draw_animated_frames_and_wait(
        &mut self,
        sprite: &AnimatedImage<'_>,
        first: usize,
        last: usize,
        x: i32,
        y: i32,
        now_ms: u64,
    ) -> Option<Hold> {
        let (frame, hold) = sprite.ranged_hold_frame(first, last, now_ms)?;
        self.draw_animated_frame(sprite, frame, x, y);
        Some(hold)
    }
}
