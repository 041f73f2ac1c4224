//! Periodic transmission requester.
//!
//! [`Beacon`] requests the same payload at a fixed interval, counted in ticks so it can
//! be polled from the tick loop or the timer interrupt without any other time base.
//! When a request comes due while the previous frame is still in flight the beacon
//! stays due and retries on the next poll, so it never trips [`TxError::Busy`].

use crate::consts::{BEACON_FIRST_AFTER_MS, BEACON_PAYLOAD, BEACON_PERIOD_MS};
use crate::driver::ManchesterTx;
use crate::error::TxError;
use crate::timer::TICK_PERIOD_US;
use embedded_hal::digital::OutputPin;

/// Requests one payload byte every `period_ticks` ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Beacon {
    payload: u8,
    period_ticks: u32,
    countdown: u32,
    /// Number of frames this beacon has started.
    pub requested: u16,
}

impl Default for Beacon {
    /// Sends [`BEACON_PAYLOAD`] one second after start, then every 2.5 seconds.
    fn default() -> Self {
        Self::from_millis(
            BEACON_PAYLOAD,
            BEACON_FIRST_AFTER_MS,
            BEACON_PERIOD_MS,
            TICK_PERIOD_US,
        )
    }
}

impl Beacon {
    /// Creates a beacon that first fires after `first_after_ticks` polls and then every
    /// `period_ticks` polls.
    ///
    /// A `first_after_ticks` of `0` or `1` fires on the first poll. A `period_ticks`
    /// of `0` is treated as `1`.
    pub const fn new(payload: u8, first_after_ticks: u32, period_ticks: u32) -> Self {
        Self {
            payload,
            period_ticks: if period_ticks == 0 { 1 } else { period_ticks },
            countdown: first_after_ticks,
            requested: 0,
        }
    }

    /// Same as [`new()`](Beacon::new) with delays in milliseconds, converted with the
    /// given tick period.
    pub const fn from_millis(
        payload: u8,
        first_after_ms: u32,
        period_ms: u32,
        tick_us: u32,
    ) -> Self {
        Self::new(
            payload,
            ms_to_ticks(first_after_ms, tick_us),
            ms_to_ticks(period_ms, tick_us),
        )
    }

    /// Payload sent on every request.
    pub const fn payload(&self) -> u8 {
        self.payload
    }

    /// Changes the payload used by the next request.
    pub fn set_payload(&mut self, payload: u8) {
        self.payload = payload;
    }

    /// Interval between two requests, in ticks.
    pub const fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    /// Call once per tick.
    ///
    /// # Returns
    /// - `Ok(true)`: a new frame was requested on this poll
    /// - `Ok(false)`: nothing due, or still waiting for the previous frame
    ///
    /// # Errors
    /// Whatever [`ManchesterTx::try_request`] reports besides `WouldBlock`.
    pub fn poll<TX: OutputPin>(&mut self, tx: &mut ManchesterTx<TX>) -> Result<bool, TxError> {
        if self.countdown > 1 {
            self.countdown -= 1;
            return Ok(false);
        }
        match tx.try_request(self.payload) {
            Ok(()) => {
                self.countdown = self.period_ticks;
                self.requested = self.requested.wrapping_add(1);
                Ok(true)
            }
            Err(nb::Error::WouldBlock) => Ok(false),
            Err(nb::Error::Other(e)) => Err(e),
        }
    }
}

const fn ms_to_ticks(ms: u32, tick_us: u32) -> u32 {
    if tick_us == 0 {
        return 0;
    }
    let ticks = (ms as u64 * 1_000) / tick_us as u64;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICKS_PER_FRAME;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;
    use embedded_hal_mock::eh1::digital::{State as PinState, Transaction as PinTransaction};

    #[test]
    fn test_default_beacon_timing() {
        let beacon = Beacon::default();
        assert_eq!(beacon.payload(), 0b1011_0010);
        assert_eq!(beacon.period_ticks(), 500);
        assert_eq!(beacon.countdown, 200);
    }

    #[test]
    fn test_beacon_fires_after_delay_then_periodically() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut driver = ManchesterTx::new(tx).unwrap();
        let mut beacon = Beacon::new(0x42, 3, 40);

        assert_eq!(beacon.poll(&mut driver), Ok(false));
        assert_eq!(beacon.poll(&mut driver), Ok(false));
        assert_eq!(beacon.poll(&mut driver), Ok(true));
        assert!(driver.is_busy());
        assert_eq!(driver.encoder.payload(), 0x42);

        // Finish the frame without touching the pin
        for _ in 0..TICKS_PER_FRAME {
            let _ = driver.encoder.on_tick();
        }
        for _ in 0..39 {
            assert_eq!(beacon.poll(&mut driver), Ok(false));
        }
        assert_eq!(beacon.poll(&mut driver), Ok(true));
        assert_eq!(beacon.requested, 2);
        assert_eq!(driver.rejected, 0);
        driver.tx.done();
    }

    #[test]
    fn test_beacon_waits_for_previous_frame() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut driver = ManchesterTx::new(tx).unwrap();
        let mut beacon = Beacon::new(0x99, 1, 4);

        assert_eq!(beacon.poll(&mut driver), Ok(true));
        for _ in 0..10 {
            assert_eq!(beacon.poll(&mut driver), Ok(false));
        }
        assert_eq!(driver.rejected, 0);

        for _ in 0..TICKS_PER_FRAME {
            let _ = driver.encoder.on_tick();
        }
        assert_eq!(beacon.poll(&mut driver), Ok(true));
        assert_eq!(beacon.requested, 2);
        driver.tx.done();
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(2_500, 5_000), 500);
        assert_eq!(ms_to_ticks(1_000, 0), 0);
        assert_eq!(ms_to_ticks(u32::MAX, 1), u32::MAX);
        let beacon = Beacon::new(0, 0, 0);
        assert_eq!(beacon.period_ticks(), 1);
    }
}
