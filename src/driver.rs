//! Manchester OOK transmitter bound to an output pin.
//!
//! This module provides the [`ManchesterTx`] struct, which couples the pure
//! [`Encoder`] state machine with an `embedded-hal` output pin. Every call to
//! [`tick()`](ManchesterTx::tick) advances the encoder by one half-bit and drives the
//! pin to the resulting level.
//!
//! The driver operates independently of the target platform's oscillator speed,
//! provided that [`tick()`](ManchesterTx::tick) is called at regular intervals
//! (every 5 ms for the nominal 100 bit/s line rate).
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use manchester_ook::driver::ManchesterTx;
//!
//! fn main() {
//!     # let tx_pin = Pin::new(&[
//!     #     PinTransaction::set(PinState::Low),
//!     #     PinTransaction::set(PinState::Low),
//!     # ]);
//!     let mut tx = ManchesterTx::new(tx_pin).unwrap();
//!
//!     loop {
//!         tx.tick().unwrap(); // Called every 5 ms by a delay or timer interrupt
//!         # break; // For testing purposes
//!     }
//!     # tx.tx.done();
//! }
//! ```
//!
//! For timer and tick scheduling helpers, see [`crate::timer`].

use crate::encoder::{Encoder, Level, TxState};
use crate::error::TxError;
use embedded_hal::digital::{Error as _, OutputPin};

use core::convert::Infallible;

/// A Manchester transmitter driving one output pin.
///
/// Owns the pin and the [`Encoder`] so that the tick handler and the requester only
/// need to share this one value.
///
/// ## Type Parameters
///
/// - `TX`: A type implementing [`embedded_hal::digital::OutputPin`] wired to the line
///   (e.g. the data input of an OOK transmitter module)
///
/// ## Notes
///
/// - Only one `ManchesterTx` instance should be active if you're using interrupts.
/// - The pin is written on every tick, including idle ticks.
#[derive(Debug)]
pub struct ManchesterTx<TX>
where
    TX: OutputPin,
{
    /// TX pin
    pub tx: TX,
    /// Framing state
    pub encoder: Encoder,
    /// Number of frames clocked out in full since construction.
    pub frames_sent: u16,
    /// Number of requests rejected because a frame was still in flight.
    pub rejected: u16,
}

impl<TX> ManchesterTx<TX>
where
    TX: OutputPin,
{
    /// Creates a new transmitter on `tx` and drives the line to its idle (low) level.
    ///
    /// # Errors
    /// - [`TxError::Pin`] if the pin cannot be driven low.
    pub fn new(tx: TX) -> Result<Self, TxError> {
        let mut cls = Self {
            tx,
            encoder: Encoder::new(),
            frames_sent: 0,
            rejected: 0,
        };
        cls.write_tx(cls.encoder.output())?;
        Ok(cls)
    }

    fn write_tx(&mut self, level: Level) -> Result<(), TxError> {
        let result = match level {
            Level::High => self.tx.set_high(),
            Level::Low => self.tx.set_low(),
        };
        result.map_err(|e| TxError::Pin(e.kind()))
    }

    /// Queues `byte` for transmission.
    ///
    /// The preamble starts on the next [`tick()`](ManchesterTx::tick).
    ///
    /// # Errors
    /// - [`TxError::Busy`] if a frame is still in flight. The running frame is not
    ///   disturbed and [`rejected`](ManchesterTx::rejected) is incremented.
    pub fn request_transmission(&mut self, byte: u8) -> Result<(), TxError> {
        match self.encoder.request_transmission(byte) {
            Ok(()) => {
                debug!("transmission of {} requested", byte);
                Ok(())
            }
            Err(e) => {
                self.rejected = self.rejected.wrapping_add(1);
                warn!("transmission of {} rejected, frame in flight", byte);
                Err(e)
            }
        }
    }

    /// Non-blocking form of [`request_transmission()`](ManchesterTx::request_transmission).
    ///
    /// Returns `WouldBlock` instead of [`TxError::Busy`], which makes it usable with
    /// `nb::block!` from a main loop that must wait for the previous frame.
    pub fn try_request(&mut self, byte: u8) -> nb::Result<(), TxError> {
        if self.encoder.is_busy() {
            return Err(nb::Error::WouldBlock);
        }
        self.request_transmission(byte).map_err(nb::Error::Other)
    }

    /// Resolves once the frame in flight (if any) has been clocked out.
    pub fn wait_transmission_complete(&self) -> nb::Result<(), Infallible> {
        if self.encoder.is_busy() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Advances the encoder by one half-bit and drives the pin.
    ///
    /// This function must be called at fixed intervals (e.g. every 5 ms).
    ///
    /// # Timing
    /// Must be called precisely and regularly, ideally via timer interrupt.
    ///
    /// # Returns
    /// The level now present on the line.
    ///
    /// # Errors
    /// - [`TxError::Pin`] if the pin could not be driven. The encoder has still advanced,
    ///   so the frame keeps its timing.
    pub fn tick(&mut self) -> Result<Level, TxError> {
        let was_busy = self.encoder.is_busy();
        let level = self.encoder.on_tick();
        if was_busy && !self.encoder.is_busy() {
            self.frames_sent = self.frames_sent.wrapping_add(1);
            trace!("frame {} complete", self.frames_sent);
        }
        self.write_tx(level)?;
        Ok(level)
    }

    /// `true` while a frame is requested or in flight.
    pub fn is_busy(&self) -> bool {
        self.encoder.is_busy()
    }

    /// Current mode of the encoder.
    pub fn state(&self) -> TxState {
        self.encoder.state()
    }

    /// Level driven by the most recent tick.
    pub fn output(&self) -> Level {
        self.encoder.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICKS_PER_FRAME_USIZE;
    use crate::encoder::{HalfPhase, byte_levels};
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::io::ErrorKind as IoErrorKind;

    fn set(level: Level) -> PinTransaction {
        PinTransaction::set(if level.is_high() {
            PinState::High
        } else {
            PinState::Low
        })
    }

    #[test]
    fn test_driver_initialization() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);

        let mut driver = ManchesterTx::new(tx).unwrap();

        assert_eq!(driver.state(), TxState::Idle);
        assert_eq!(driver.output(), Level::Low);
        assert_eq!(driver.frames_sent, 0);
        driver.tx.done();
    }

    #[test]
    fn test_idle_tick_drives_low() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let mut driver = ManchesterTx::new(tx).unwrap();

        assert_eq!(driver.tick(), Ok(Level::Low));
        assert_eq!(driver.tick(), Ok(Level::Low));
        driver.tx.done();
    }

    #[test]
    fn test_tick_transmit_drives_frame() {
        let payload = 0b1011_0010;
        let preamble = byte_levels(0xFF);
        let data = byte_levels(payload);
        // Idle on construction, 32 frame ticks, then one idle tick
        let expectations: [PinTransaction; TICKS_PER_FRAME_USIZE + 2] =
            core::array::from_fn(|i| match i {
                1..=16 => set(preamble[i - 1]),
                17..=32 => set(data[i - 17]),
                _ => set(Level::Low),
            });
        let tx = PinMock::new(&expectations);

        let mut driver = ManchesterTx::new(tx).unwrap();
        driver.request_transmission(payload).unwrap();
        assert_eq!(driver.state(), TxState::Preamble);

        for _ in 0..TICKS_PER_FRAME_USIZE {
            let _ = driver.tick().unwrap();
        }
        assert!(!driver.is_busy());
        assert_eq!(driver.frames_sent, 1);

        assert_eq!(driver.tick(), Ok(Level::Low));
        assert_eq!(driver.frames_sent, 1);
        driver.tx.done();
    }

    #[test]
    fn test_request_while_busy_is_counted() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let mut driver = ManchesterTx::new(tx).unwrap();

        driver.request_transmission(0x01).unwrap();
        let _ = driver.tick().unwrap();
        assert_eq!(driver.request_transmission(0x02), Err(TxError::Busy));
        assert_eq!(driver.rejected, 1);
        assert_eq!(driver.encoder.payload(), 0x01);
        driver.tx.done();
    }

    #[test]
    fn test_try_request_would_block_while_busy() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut driver = ManchesterTx::new(tx).unwrap();

        assert_eq!(driver.wait_transmission_complete(), Ok(()));
        assert_eq!(driver.try_request(0x10), Ok(()));
        assert_eq!(driver.try_request(0x20), Err(nb::Error::WouldBlock));
        assert_eq!(driver.wait_transmission_complete(), Err(nb::Error::WouldBlock));
        assert_eq!(driver.rejected, 0);
        driver.tx.done();
    }

    #[test]
    fn test_pin_error_keeps_frame_timing() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low).with_error(MockError::Io(IoErrorKind::Other)),
            PinTransaction::set(PinState::High),
        ]);
        let mut driver = ManchesterTx::new(tx).unwrap();
        driver.request_transmission(0xFF).unwrap();

        assert_eq!(driver.tick(), Err(TxError::Pin(ErrorKind::Other)));
        assert_eq!(driver.encoder.half_phase(), HalfPhase::Second);
        assert_eq!(driver.output(), Level::Low);

        assert_eq!(driver.tick(), Ok(Level::High));
        assert_eq!(driver.encoder.half_phase(), HalfPhase::First);
        assert_eq!(driver.encoder.bit_index(), 1);
        driver.tx.done();
    }

    #[test]
    fn test_new_reports_pin_error() {
        let mut tx = PinMock::new(&[
            PinTransaction::set(PinState::Low).with_error(MockError::Io(IoErrorKind::Other))
        ]);

        assert!(matches!(
            ManchesterTx::new(tx.clone()),
            Err(TxError::Pin(ErrorKind::Other))
        ));
        tx.done();
    }
}
