//! Constants used across the Manchester framing implementation.
//!
//! The frame layout, line coding and tick budget are fixed at compile time:
//!
//! - **Preamble**: one all-ones byte that lets a receiver lock onto the bit timing.
//! - **Payload**: one data byte, sent most-significant bit first.
//! - **Cells**: every bit spans two ticks (two half-bit phases).
//!
//! Timer related values (tick period, preload) live in [`crate::timer`].

/// Sync byte sent ahead of every payload.
///
/// Encoded as eight `LOW, HIGH` cells, i.e. a plain 50% duty square wave at the bit rate.
pub const PREAMBLE_BYTE: u8 = 0xFF;

/// Number of bits encoded per byte.
pub const BITS_PER_BYTE: u8 = 8;

/// Number of ticks (half-bit phases) per Manchester bit cell.
pub const TICKS_PER_BIT: u8 = 2;

/// Number of ticks needed to encode one byte.
pub const TICKS_PER_BYTE: u8 = BITS_PER_BYTE * TICKS_PER_BIT;

/// Bytes in a frame: the preamble and the payload.
pub const FRAME_BYTES: u8 = 2;

/// Number of ticks between a request and the end of its transmission.
pub const TICKS_PER_FRAME: u8 = FRAME_BYTES * TICKS_PER_BYTE;

/// See [`TICKS_PER_BYTE`](crate::consts::TICKS_PER_BYTE)
pub const TICKS_PER_BYTE_USIZE: usize = TICKS_PER_BYTE as usize;

/// See [`TICKS_PER_FRAME`](crate::consts::TICKS_PER_FRAME)
pub const TICKS_PER_FRAME_USIZE: usize = TICKS_PER_FRAME as usize;

/// Payload sent by the default beacon.
pub const BEACON_PAYLOAD: u8 = 0b1011_0010;

/// Delay before the default beacon makes its first request.
pub const BEACON_FIRST_AFTER_MS: u32 = 1_000;

/// Interval between two requests of the default beacon.
pub const BEACON_PERIOD_MS: u32 = 2_500;
