//! Reference decoder for tick-aligned line captures.
//!
//! These helpers turn a sequence of line levels, sampled once per tick in step with
//! the encoder, back into payload bytes. They are meant for loopback checks and bench
//! captures, not for demodulating a free-running radio signal: there is no clock
//! recovery, and every sample is assumed to be one half-bit.
//!
//! ## Cell decoding
//!
//! | First half | Second half | Bit     |
//! |------------|-------------|---------|
//! | `HIGH`     | `LOW`       | `0`     |
//! | `LOW`      | `HIGH`      | `1`     |
//! | equal      | equal       | invalid |
//!
//! ## Functions
//!
//! - [`decode_cell`]: Converts one two-sample cell into a bit
//! - [`decode_byte`]: Converts 16 samples into a byte, MSB first
//! - [`find_frame`]: Locates the preamble in a capture and decodes the payload after it
//! - [`despeckle`]: Removes single-sample HIGH glitches from a capture
//! - [`FrameDecoder`]: Streaming form of [`find_frame`]

use crate::consts::{PREAMBLE_BYTE, TICKS_PER_BYTE_USIZE, TICKS_PER_FRAME_USIZE};
use crate::encoder::{Level, byte_levels};
use heapless::Deque;

/// Expected line levels while the preamble is being sent.
pub const PREAMBLE_LEVELS: [Level; TICKS_PER_BYTE_USIZE] = byte_levels(PREAMBLE_BYTE);

/// Decodes one Manchester cell.
///
/// Returns `None` if both halves carry the same level (no mid-bit transition).
pub const fn decode_cell(first: Level, second: Level) -> Option<bool> {
    match (first, second) {
        (Level::High, Level::Low) => Some(false),
        (Level::Low, Level::High) => Some(true),
        _ => None,
    }
}

/// Decodes 16 half-bit samples into a byte, most-significant bit first.
///
/// Returns `None` if `levels` is not exactly 16 samples long or if any cell lacks its
/// mid-bit transition.
pub fn decode_byte(levels: &[Level]) -> Option<u8> {
    if levels.len() != TICKS_PER_BYTE_USIZE {
        return None;
    }
    let mut byte = 0u8;
    for cell in levels.chunks(2) {
        let bit = decode_cell(cell[0], cell[1])?;
        byte = (byte << 1) | u8::from(bit);
    }
    Some(byte)
}

/// Searches `levels` for the first preamble followed by a valid payload byte.
///
/// # Returns
/// - `Some((offset, payload))`: `offset` is the index of the first preamble sample
/// - `None`: no complete frame is present
pub fn find_frame(levels: &[Level]) -> Option<(usize, u8)> {
    if levels.len() < TICKS_PER_FRAME_USIZE {
        return None;
    }
    (0..=levels.len() - TICKS_PER_FRAME_USIZE).find_map(|offset| {
        let frame = &levels[offset..offset + TICKS_PER_FRAME_USIZE];
        if frame[..TICKS_PER_BYTE_USIZE] != PREAMBLE_LEVELS {
            return None;
        }
        decode_byte(&frame[TICKS_PER_BYTE_USIZE..]).map(|payload| (offset, payload))
    })
}

/// Replaces every isolated HIGH sample (no HIGH neighbour on either side) with LOW.
///
/// Short noise spikes on an idle OOK receiver show up as single HIGH samples; a
/// genuine half-bit never does inside an idle stretch. Note that a frame also contains
/// single HIGH samples, so only run this over captures taken at a finer rate than one
/// sample per tick, or over idle stretches.
///
/// # Returns
/// The number of samples that were cleared.
pub fn despeckle(levels: &mut [Level]) -> usize {
    let mut cleared = 0;
    let mut previous = Level::Low;
    for i in 0..levels.len() {
        let current = levels[i];
        let next = levels.get(i + 1).copied().unwrap_or(Level::Low);
        if current.is_high() && !previous.is_high() && !next.is_high() {
            levels[i] = Level::Low;
            cleared += 1;
        }
        previous = current;
    }
    cleared
}

/// Streaming frame decoder fed one line sample per tick.
///
/// Keeps the last [`TICKS_PER_FRAME`](crate::consts::TICKS_PER_FRAME) samples and reports
/// the payload as soon as they hold a preamble followed by a valid byte.
///
/// ## Example
///
/// ```rust
/// use manchester_ook::decode::FrameDecoder;
/// use manchester_ook::encoder::Encoder;
///
/// let mut encoder = Encoder::new();
/// let mut decoder = FrameDecoder::new();
/// encoder.request_transmission(0x5A).unwrap();
///
/// let mut received = None;
/// for _ in 0..40 {
///     if let Some(byte) = decoder.push(encoder.on_tick()) {
///         received = Some(byte);
///     }
/// }
/// assert_eq!(received, Some(0x5A));
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    window: Deque<Level, TICKS_PER_FRAME_USIZE>,
    /// Number of frames decoded since construction.
    pub frames: u16,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub const fn new() -> Self {
        Self {
            window: Deque::new(),
            frames: 0,
        }
    }

    /// Feeds the next sample.
    ///
    /// # Returns
    /// - `Some(byte)`: a complete frame just ended with this sample. The window is
    ///   cleared so the same frame is never reported twice.
    /// - `None`: no complete frame in the window yet
    pub fn push(&mut self, level: Level) -> Option<u8> {
        if self.window.is_full() {
            let _ = self.window.pop_front();
        }
        let _ = self.window.push_back(level);
        if !self.window.is_full() {
            return None;
        }

        let mut frame = [Level::Low; TICKS_PER_FRAME_USIZE];
        for (slot, sample) in frame.iter_mut().zip(self.window.iter()) {
            *slot = *sample;
        }
        let (_, payload) = find_frame(&frame)?;
        self.window.clear();
        self.frames = self.frames.wrapping_add(1);
        debug!("decoded frame {} carrying {}", self.frames, payload);
        Some(payload)
    }

    /// Drops every buffered sample.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// `true` if no sample is buffered.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
