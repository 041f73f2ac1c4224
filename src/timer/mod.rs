//! Tick source abstraction and timing helpers.
//!
//! The encoder needs one tick per half-bit. This module isolates everything that is
//! about producing those ticks from the encoding itself:
//!
//! - [`TickSource`]: the hardware timer seen by the tick handler (reload, acknowledge,
//!   mask, unmask)
//! - [`service_tick`]: the full handler body (reload, acknowledge, then one encoder step)
//! - [`SuspendedTicks`]: scoped masking of the tick interrupt around a request
//! - preload calculators for a 16-bit overflow timer
//! - `run_tick_loop`/`run_beacon_loop`: blocking loops for `DelayNs` (feature `delay-loop`)
//! - `global_tx_tick` and `tick_manchester_tx!()`: interrupt-based helpers around a
//!   `critical_section::Mutex` (feature `timer-isr`)
//!
//! ## Timer model
//!
//! The tick comes from a 16-bit up-counter that interrupts when it overflows. The
//! handler writes a preload so that `65536 - preload` counts elapse until the next
//! overflow. With the 31 kHz low-frequency oscillator and no prescaler:
//!
//! | Preload  | Counts | Tick period | Bit rate   |
//! |----------|--------|-------------|------------|
//! | `0xFF65` |    155 |   5 ms      | 100 bit/s  |
//! | `0xFE0A` |    502 | ~16.2 ms    | ~31 bit/s  |
//! | `0xF930` |   1744 | ~56.3 ms    | ~8.9 bit/s |

use crate::consts::{TICKS_PER_BIT, TICKS_PER_FRAME};
use crate::driver::ManchesterTx;
use crate::encoder::Level;
use crate::error::TxError;
use core::ops::{Deref, DerefMut};
use embedded_hal::digital::OutputPin;
use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Counts in one full period of a 16-bit timer.
pub const TIMER_OVERFLOW: u32 = 65_536;

/// Nominal frequency of the low-frequency internal oscillator clocking the timer.
pub const LFINTOSC_HZ: u32 = 31_000;

/// Timer prescaler (1:1).
pub const TIMER_PRESCALER: u32 = 1;

/// Nominal interval between two ticks: 5 ms.
pub const TICK_PERIOD_US: u32 = 5_000;

/// Preload giving [`TICK_PERIOD_US`] from [`LFINTOSC_HZ`]: `65536 - 155 = 0xFF65`.
///
/// Some firmware notes give this value as `0xFF05`, which is 251 counts (~8.1 ms).
pub const DEFAULT_PRELOAD: u16 = const_preload(LFINTOSC_HZ, TIMER_PRESCALER, TICK_PERIOD_US);

/// Preload found in early firmware builds. Yields a ~56.3 ms tick at [`LFINTOSC_HZ`].
pub const LEGACY_PRELOAD: u16 = 0xF930;

/// Line rate at the nominal tick period.
pub const BITS_PER_SECOND: u32 = 1_000_000 / bit_period_us(TICK_PERIOD_US);

const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

const fn preload_for_counts(counts: u64) -> u16 {
    let counts = if counts == 0 {
        1
    } else if counts > TIMER_OVERFLOW as u64 {
        TIMER_OVERFLOW as u64
    } else {
        counts
    };
    (TIMER_OVERFLOW as u64 - counts) as u16
}

/// Computes the preload for a 16-bit overflow timer.
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `prescaler`: timer prescaler (e.g., 1, 2, 4, 8)
/// - `tick_us`: desired tick interval in microseconds (e.g., 5000.0)
///
/// # Returns
/// - The value to load into the counter (rounds to the nearest count). Periods longer
///   than the timer can hold saturate at `0`.
pub fn compute_preload(f_clk: u32, prescaler: u32, tick_us: f32) -> u16 {
    let counts_per_second = f64::from(f_clk) / f64::from(prescaler.max(1));
    let counts = round(counts_per_second * f64::from(tick_us) / 1_000_000.0);
    preload_for_counts(if counts <= 0.0 { 0 } else { counts as u64 })
}

/// Compile-time preload calculator.
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `prescaler`: timer prescaler (e.g., 1, 2, 4, 8)
/// - `tick_us`: desired tick interval in whole microseconds
///
/// # Returns
/// - The value to load into the counter (rounds to the nearest count)
pub const fn const_preload(f_clk: u32, prescaler: u32, tick_us: u32) -> u16 {
    let prescaler = if prescaler == 0 { 1 } else { prescaler };
    let counts = ((f_clk / prescaler) as u64 * tick_us as u64 + MICROSECONDS_PER_SECOND / 2)
        / MICROSECONDS_PER_SECOND;
    preload_for_counts(counts)
}

/// Tick period, in microseconds, produced by `preload`.
pub const fn preload_period_us(f_clk: u32, prescaler: u32, preload: u16) -> u32 {
    if f_clk == 0 {
        return 0;
    }
    let counts = TIMER_OVERFLOW as u64 - preload as u64;
    let period = counts
        .saturating_mul(prescaler as u64)
        .saturating_mul(MICROSECONDS_PER_SECOND)
        / f_clk as u64;
    if period > u32::MAX as u64 {
        u32::MAX
    } else {
        period as u32
    }
}

/// Duration of one Manchester bit cell for a given tick period.
pub const fn bit_period_us(tick_us: u32) -> u32 {
    tick_us.saturating_mul(TICKS_PER_BIT as u32)
}

/// Time taken by one full frame (preamble and payload) for a given tick period.
pub const fn frame_duration_us(tick_us: u32) -> u32 {
    tick_us.saturating_mul(TICKS_PER_FRAME as u32)
}

/// The periodic timer feeding the encoder.
///
/// Implement this for the hardware timer whose interrupt calls [`service_tick`]. Every
/// method is expected to be a handful of register writes.
pub trait TickSource {
    /// Writes the preload for the next period.
    fn reload(&mut self);

    /// Acknowledges the pending interrupt so it is not delivered twice.
    fn clear_pending(&mut self);

    /// Masks the tick interrupt. Ticks that fall due while masked are delivered on
    /// [`resume()`](TickSource::resume).
    fn suspend(&mut self);

    /// Unmasks the tick interrupt.
    fn resume(&mut self);
}

/// Runs the complete tick handler.
///
/// Reloads the timer first so that handler latency does not stretch the period, then
/// acknowledges the interrupt, then advances the transmitter and drives its pin.
///
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER1() {
///     // TIMER and TX are owned by the interrupt, e.g. via RTIC resources
///     let _ = service_tick(&mut TIMER, &mut TX);
/// }
/// ```
pub fn service_tick<T, TX>(source: &mut T, tx: &mut ManchesterTx<TX>) -> Result<Level, TxError>
where
    T: TickSource,
    TX: OutputPin,
{
    source.reload();
    source.clear_pending();
    tx.tick()
}

/// Keeps the tick interrupt masked for as long as it lives.
///
/// Created by [`SuspendedTicks::new`]; resumes the source when dropped. The source stays
/// reachable through `Deref`/`DerefMut`.
#[derive(Debug)]
pub struct SuspendedTicks<'a, T: TickSource> {
    source: &'a mut T,
}

impl<'a, T: TickSource> SuspendedTicks<'a, T> {
    /// Masks `source` until the returned guard is dropped.
    pub fn new(source: &'a mut T) -> Self {
        source.suspend();
        Self { source }
    }
}

impl<T: TickSource> Deref for SuspendedTicks<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl<T: TickSource> DerefMut for SuspendedTicks<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.source
    }
}

impl<T: TickSource> Drop for SuspendedTicks<'_, T> {
    fn drop(&mut self) {
        self.source.resume();
    }
}

/// Requests a frame with the tick interrupt masked.
///
/// Use this when `tx` is shared with an interrupt that calls [`service_tick`] and no
/// global critical section is wanted.
pub fn request_with_ticks_suspended<T, TX>(
    source: &mut T,
    tx: &mut ManchesterTx<TX>,
    byte: u8,
) -> Result<(), TxError>
where
    T: TickSource,
    TX: OutputPin,
{
    let _suspended = SuspendedTicks::new(source);
    tx.request_transmission(byte)
}
