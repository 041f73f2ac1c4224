//! Tick-driven Manchester encoder state machine.
//!
//! [`Encoder`] holds every piece of state shared between the tick handler and the
//! code requesting transmissions. It knows nothing about pins or timers: each call to
//! [`Encoder::on_tick`] advances the frame by one half-bit and returns the level the
//! line must take for the coming tick period.
//!
//! ## Line coding
//!
//! | Bit | First half | Second half |
//! |-----|------------|-------------|
//! | `0` | `HIGH`     | `LOW`       |
//! | `1` | `LOW`      | `HIGH`      |
//!
//! The first half carries the inverted bit value, the second half always flips the
//! line, so there is a transition at the middle of every cell.
//!
//! ## States
//!
//! ```text
//!  request_transmission()      8 preamble bits        8 payload bits
//! IDLE ─────────────────▶ PREAMBLE ────────────▶ PAYLOAD ────────────▶ IDLE
//! ```
//!
//! The line is forced [`IDLE_LEVEL`] on every tick spent in `IDLE`.

use crate::consts::{BITS_PER_BYTE, PREAMBLE_BYTE, TICKS_PER_BYTE_USIZE};
use crate::error::TxError;
use core::ops::Not;

/// Electrical state of the output line.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Level {
    /// Line driven low (carrier off).
    #[default]
    Low,
    /// Line driven high (carrier on).
    High,
}

impl Level {
    /// Returns the opposite level.
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// `true` for [`Level::High`].
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        self.inverted()
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Level held on the line whenever no frame is in flight.
pub const IDLE_LEVEL: Level = Level::Low;

/// Which byte of the frame is currently being encoded.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FramePhase {
    /// Sending the [`PREAMBLE_BYTE`].
    #[default]
    Preamble,
    /// Sending the requested payload byte.
    Payload,
}

/// Position inside the current two-tick bit cell.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum HalfPhase {
    /// The next tick sets the inverted bit value.
    #[default]
    First,
    /// The next tick flips the line and moves on to the next bit.
    Second,
}

/// Externally visible mode of the encoder.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxState {
    /// No frame in flight, the line is held low.
    #[default]
    Idle,
    /// The sync preamble is being sent.
    Preamble,
    /// The payload byte is being sent.
    Payload,
}

/// Returns the two half-bit levels of one Manchester cell.
pub const fn cell_levels(bit: bool) -> [Level; 2] {
    if bit {
        [Level::Low, Level::High]
    } else {
        [Level::High, Level::Low]
    }
}

/// Returns the 16 half-bit levels that encode `byte`, most-significant bit first.
pub const fn byte_levels(byte: u8) -> [Level; TICKS_PER_BYTE_USIZE] {
    let mut levels = [IDLE_LEVEL; TICKS_PER_BYTE_USIZE];
    let mut bit = 0;
    while bit < BITS_PER_BYTE as usize {
        let cell = cell_levels((byte >> (7 - bit)) & 1 == 1);
        levels[bit * 2] = cell[0];
        levels[bit * 2 + 1] = cell[1];
        bit += 1;
    }
    levels
}

/// The shared state of one transmitter.
///
/// Owned by whoever drives the line (usually a [`ManchesterTx`](crate::driver::ManchesterTx)
/// stored behind a `critical_section::Mutex`), and mutated from two places:
///
/// - [`request_transmission()`](Encoder::request_transmission) from normal context, and
/// - [`on_tick()`](Encoder::on_tick) from the timer interrupt.
///
/// Requests must not be interleaved with a tick; wrap them in a critical section or in
/// [`SuspendedTicks`](crate::timer::SuspendedTicks) when the encoder is shared with an ISR.
///
/// ## Example
///
/// ```rust
/// use manchester_ook::encoder::{Encoder, Level, TxState};
///
/// let mut encoder = Encoder::new();
/// encoder.request_transmission(0b1011_0010).unwrap();
/// assert_eq!(encoder.state(), TxState::Preamble);
///
/// // A preamble `1` starts low and rises at mid-cell
/// assert_eq!(encoder.on_tick(), Level::Low);
/// assert_eq!(encoder.on_tick(), Level::High);
/// ```
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Encoder {
    pub(crate) output: Level,
    pub(crate) tx_request: bool,
    pub(crate) payload: u8,
    pub(crate) frame_phase: FramePhase,
    pub(crate) bit_index: u8,
    pub(crate) half_phase: HalfPhase,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates an idle encoder with the line at [`IDLE_LEVEL`].
    pub const fn new() -> Self {
        Self {
            output: IDLE_LEVEL,
            tx_request: false,
            payload: 0,
            frame_phase: FramePhase::Preamble,
            bit_index: 0,
            half_phase: HalfPhase::First,
        }
    }

    /// Starts a new frame carrying `byte`.
    ///
    /// The preamble goes out on the next tick, followed by `byte` most-significant bit
    /// first. The frame is complete [`TICKS_PER_FRAME`](crate::consts::TICKS_PER_FRAME)
    /// ticks later.
    ///
    /// # Errors
    /// - [`TxError::Busy`] if a frame is still in flight. Nothing is modified in that case.
    pub fn request_transmission(&mut self, byte: u8) -> Result<(), TxError> {
        if self.tx_request {
            return Err(TxError::Busy);
        }
        self.payload = byte;
        self.frame_phase = FramePhase::Preamble;
        self.bit_index = 0;
        self.half_phase = HalfPhase::First;
        self.tx_request = true;
        Ok(())
    }

    /// Advances the frame by one half-bit and returns the new line level.
    ///
    /// Must be called exactly once per tick. While idle this only forces the line to
    /// [`IDLE_LEVEL`].
    pub fn on_tick(&mut self) -> Level {
        if !self.tx_request {
            self.output = IDLE_LEVEL;
            return self.output;
        }

        let bit = (self.active_byte() >> (7 - self.bit_index)) & 1;
        match self.half_phase {
            HalfPhase::First => {
                self.output = if bit == 0 { Level::High } else { Level::Low };
                self.half_phase = HalfPhase::Second;
            }
            HalfPhase::Second => {
                self.output = !self.output;
                self.half_phase = HalfPhase::First;
                self.advance_bit();
            }
        }
        self.output
    }

    fn active_byte(&self) -> u8 {
        match self.frame_phase {
            FramePhase::Preamble => PREAMBLE_BYTE,
            FramePhase::Payload => self.payload,
        }
    }

    fn advance_bit(&mut self) {
        self.bit_index += 1;
        if self.bit_index < BITS_PER_BYTE {
            return;
        }
        self.bit_index = 0;
        match self.frame_phase {
            FramePhase::Preamble => self.frame_phase = FramePhase::Payload,
            FramePhase::Payload => self.tx_request = false,
        }
    }

    /// `true` while a frame is requested or in flight.
    pub const fn is_busy(&self) -> bool {
        self.tx_request
    }

    /// Current mode, derived from the request flag and the frame phase.
    pub const fn state(&self) -> TxState {
        if !self.tx_request {
            return TxState::Idle;
        }
        match self.frame_phase {
            FramePhase::Preamble => TxState::Preamble,
            FramePhase::Payload => TxState::Payload,
        }
    }

    /// Level set by the most recent tick.
    pub const fn output(&self) -> Level {
        self.output
    }

    /// Payload of the current (or last) frame.
    pub const fn payload(&self) -> u8 {
        self.payload
    }

    /// Byte currently being encoded. Meaningless while idle.
    pub const fn frame_phase(&self) -> FramePhase {
        self.frame_phase
    }

    /// Index (0 = MSB) of the bit currently being encoded.
    pub const fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// Half of the current cell the next tick will produce.
    pub const fn half_phase(&self) -> HalfPhase {
        self.half_phase
    }
}
