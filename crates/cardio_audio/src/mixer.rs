//! # Mixer
//!
//! A fixed array of channels, each either free or holding a sound:
//!
//! ```text
//!            play                  end of data (no loop), stop
//!   Free ─────────────> Playing ───────────────────────────────> Free
//!     │                  │    ^
//!     │ queue     pause  │    │ play_channel
//!     └─────────────> Paused ─┘ ──── stop ──────────────────────> Free
//! ```
//!
//! ## Threading
//!
//! [`Mixer::mix`] runs on the audio device's real-time thread. Every other
//! method runs on the main thread. All of them take the same short lock; the
//! audio thread only ever reads samples that were fully decoded before the
//! sound was handed over.
//!
//! ## Output
//!
//! Output is interleaved stereo `f32`. A mono sample `s` on a channel with
//! gains `(l, r)` adds `s * l * gain` to the left slot and `s * r * gain` to
//! the right slot of one frame.

use std::fmt;

use cardio_assets::Sound;
use parking_lot::Mutex;

use crate::error::{MixerError, MixerResult};

/// Index of a mixer channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(usize);

impl ChannelId {
    /// Creates a channel id. Ids past the channel count are rejected by
    /// every mixer method that takes one.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the channel index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.0)
    }
}

/// Observable state of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// Holds no sound.
    Free,
    /// Holds a sound and contributes to the mix.
    Playing,
    /// Holds a sound but is silent.
    Paused,
}

/// A sound loaded into a channel.
#[derive(Clone, Copy, Debug)]
struct Voice<'a> {
    samples: &'a [f32],
    cursor: usize,
    left_gain: f32,
    right_gain: f32,
    looping: bool,
    playing: bool,
}

impl Voice<'_> {
    /// Adds this voice into `out` and advances the cursor.
    ///
    /// Returns `false` once the voice has finished and must be released.
    fn render(&mut self, out: &mut [f32], gain: f32) -> bool {
        let length = self.samples.len();
        if length == 0 {
            return false;
        }
        let left = self.left_gain * gain;
        let right = self.right_gain * gain;

        for frame in out.chunks_exact_mut(2) {
            if self.cursor >= length {
                if !self.looping {
                    return false;
                }
                self.cursor = 0;
            }
            let sample = self.samples[self.cursor];
            frame[0] += sample * left;
            frame[1] += sample * right;
            self.cursor += 1;
        }

        if self.cursor >= length {
            self.cursor = 0;
            return self.looping;
        }
        true
    }
}

#[derive(Debug)]
struct MixerState<'a> {
    channels: Box<[Option<Voice<'a>>]>,
    gain: f32,
}

/// Fixed-channel stereo mixer.
///
/// `'a` is the lifetime of the sample buffers, normally a scene or
/// persistent pool. The mixer is `Sync`; share it with the audio thread by
/// reference from a scoped thread.
///
/// # Example
///
/// ```rust
/// use cardio_assets::Sound;
/// use cardio_audio::Mixer;
///
/// let samples = [0.5f32; 4];
/// let beat = Sound::new(&samples);
/// let mixer = Mixer::new(16, 1.0).unwrap();
///
/// let channel = mixer.queue(&beat, 1.0, 1.0, false).unwrap();
/// mixer.play_channel(channel);
///
/// let mut out = [0.0f32; 8];
/// mixer.mix(&mut out);
/// assert_eq!(out, [0.5; 8]);
/// assert!(!mixer.is_playing(&beat));
/// ```
#[derive(Debug)]
pub struct Mixer<'a> {
    state: Mutex<MixerState<'a>>,
    channel_count: usize,
}

impl<'a> Mixer<'a> {
    /// Creates a mixer with `channel_count` free channels.
    ///
    /// # Errors
    ///
    /// [`MixerError::NoChannels`] for zero channels and
    /// [`MixerError::Allocation`] if the channel array cannot be reserved.
    pub fn new(channel_count: usize, master_gain: f32) -> MixerResult<Self> {
        if channel_count == 0 {
            return Err(MixerError::NoChannels);
        }
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(channel_count)
            .map_err(|_| MixerError::Allocation {
                channels: channel_count,
            })?;
        channels.resize(channel_count, None);

        tracing::debug!(channels = channel_count, gain = master_gain, "mixer created");
        Ok(Self {
            state: Mutex::new(MixerState {
                channels: channels.into_boxed_slice(),
                gain: master_gain,
            }),
            channel_count,
        })
    }

    /// Number of channels, fixed at creation.
    #[inline]
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Returns the master gain.
    #[must_use]
    pub fn gain(&self) -> f32 {
        self.state.lock().gain
    }

    /// Sets the master gain, applied to every channel from the next mix.
    pub fn set_gain(&self, gain: f32) {
        self.state.lock().gain = gain;
    }

    /// Fills `out` with the next `out.len() / 2` interleaved stereo frames.
    ///
    /// `out` is zeroed first; an odd trailing slot stays zero. Looping
    /// channels wrap and keep filling within the same call. Channels that
    /// run out of data without looping are released.
    ///
    /// Real-time safe: no allocation, no logging, one lock.
    pub fn mix(&self, out: &mut [f32]) {
        out.fill(0.0);
        let mut state = self.state.lock();
        let gain = state.gain;
        for slot in state.channels.iter_mut() {
            let finished = match slot {
                Some(voice) if voice.playing => !voice.render(out, gain),
                _ => false,
            };
            if finished {
                *slot = None;
            }
        }
    }

    /// Starts `sound` on the first free channel.
    ///
    /// # Returns
    ///
    /// The channel, or `None` if every channel is taken. Nothing changes in
    /// that case.
    pub fn play(&self, sound: &Sound<'a>, left_gain: f32, right_gain: f32, looping: bool) -> Option<ChannelId> {
        self.occupy(sound, left_gain, right_gain, looping, true)
    }

    /// Loads `sound` on the first free channel without starting it.
    ///
    /// The channel starts on [`Mixer::play_channel`], so a sound can be
    /// armed ahead of the beat it belongs to.
    ///
    /// # Returns
    ///
    /// The channel, or `None` if every channel is taken.
    pub fn queue(&self, sound: &Sound<'a>, left_gain: f32, right_gain: f32, looping: bool) -> Option<ChannelId> {
        self.occupy(sound, left_gain, right_gain, looping, false)
    }

    fn occupy(
        &self,
        sound: &Sound<'a>,
        left_gain: f32,
        right_gain: f32,
        looping: bool,
        playing: bool,
    ) -> Option<ChannelId> {
        let taken = {
            let mut state = self.state.lock();
            state
                .channels
                .iter_mut()
                .enumerate()
                .find(|(_, slot)| slot.is_none())
                .map(|(index, slot)| {
                    *slot = Some(Voice {
                        samples: sound.samples(),
                        cursor: 0,
                        left_gain,
                        right_gain,
                        looping,
                        playing,
                    });
                    ChannelId(index)
                })
        };
        match taken {
            Some(id) => tracing::debug!(%id, samples = sound.sample_count(), looping, playing, "sound loaded"),
            None => tracing::warn!(channels = self.channel_count, "no free mixer channel"),
        }
        taken
    }

    /// Starts a loaded channel.
    ///
    /// # Returns
    ///
    /// `false` if `id` is out of range or the channel is free.
    pub fn play_channel(&self, id: ChannelId) -> bool {
        self.set_playing(id, true)
    }

    /// Silences a loaded channel, keeping its sound and position.
    ///
    /// # Returns
    ///
    /// `false` if `id` is out of range or the channel is free.
    pub fn pause_channel(&self, id: ChannelId) -> bool {
        self.set_playing(id, false)
    }

    fn set_playing(&self, id: ChannelId, playing: bool) -> bool {
        let mut state = self.state.lock();
        match state.channels.get_mut(id.0) {
            Some(Some(voice)) => {
                voice.playing = playing;
                true
            }
            _ => false,
        }
    }

    /// Releases every channel holding `sound`, playing or paused.
    ///
    /// Sounds are matched by sample buffer, not by content.
    ///
    /// # Returns
    ///
    /// The number of channels released.
    pub fn stop(&self, sound: &Sound<'_>) -> usize {
        let mut state = self.state.lock();
        let mut stopped = 0;
        for slot in state.channels.iter_mut() {
            if slot.is_some_and(|voice| sound.shares_buffer(voice.samples)) {
                *slot = None;
                stopped += 1;
            }
        }
        stopped
    }

    /// Releases every channel.
    ///
    /// # Returns
    ///
    /// The number of channels that were occupied.
    pub fn stop_all(&self) -> usize {
        let mut state = self.state.lock();
        let mut stopped = 0;
        for slot in state.channels.iter_mut() {
            if slot.take().is_some() {
                stopped += 1;
            }
        }
        stopped
    }

    /// Returns `true` if any channel holds `sound`.
    ///
    /// This means loaded, not audible: a queued or paused channel counts.
    #[must_use]
    pub fn is_playing(&self, sound: &Sound<'_>) -> bool {
        self.state
            .lock()
            .channels
            .iter()
            .flatten()
            .any(|voice| sound.shares_buffer(voice.samples))
    }

    /// Returns the state of channel `id`, or `None` if it is out of range.
    #[must_use]
    pub fn channel_state(&self, id: ChannelId) -> Option<ChannelState> {
        self.state.lock().channels.get(id.0).map(|slot| match slot {
            None => ChannelState::Free,
            Some(voice) if voice.playing => ChannelState::Playing,
            Some(_) => ChannelState::Paused,
        })
    }

    /// Returns the next sample index of channel `id`, or `None` if it is
    /// out of range or free.
    #[must_use]
    pub fn cursor(&self, id: ChannelId) -> Option<usize> {
        self.state
            .lock()
            .channels
            .get(id.0)
            .and_then(|slot| slot.as_ref().map(|voice| voice.cursor))
    }

    /// Number of channels holding a sound.
    #[must_use]
    pub fn active_channel_count(&self) -> usize {
        self.state.lock().channels.iter().flatten().count()
    }
}
