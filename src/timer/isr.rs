use crate::driver::ManchesterTx;
use crate::encoder::{Level, TxState};
use crate::error::TxError;
use crate::timer::{TickSource, service_tick};
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// A transmitter shared between the main loop and the timer interrupt.
pub type GlobalTx<TX> = Mutex<RefCell<Option<ManchesterTx<TX>>>>;

/// Used to initialize the global static `ManchesterTx` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust
/// use manchester_ook::timer::{GlobalTx, global_tx_init};
/// # use embedded_hal_mock::eh1::digital::Mock as TxPin;
///
/// static MANCHESTER_TX: GlobalTx<TxPin> = global_tx_init::<TxPin>();
/// ```
pub const fn global_tx_init<TX: OutputPin>() -> GlobalTx<TX> {
    Mutex::new(RefCell::new(None))
}

/// Builds the transmitter inside the global static and drives its line low.
///
/// # Arguments
/// * The global static `ManchesterTx`
/// * The tx pin
///
/// # Errors
/// - [`TxError::Pin`] if the line cannot be driven low. The global stays empty.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     global_tx_setup(&MANCHESTER_TX, tx).unwrap();
/// }
/// ```
pub fn global_tx_setup<TX: OutputPin>(
    global_tx: &'static GlobalTx<TX>,
    tx: TX,
) -> Result<(), TxError> {
    let driver = ManchesterTx::new(tx)?;
    critical_section::with(|cs| {
        let _ = global_tx.borrow(cs).replace(Some(driver));
    });
    Ok(())
}

/// Runs the tick handler at each interrupt.
///
/// Reloads and acknowledges `source`, then advances the shared transmitter by one
/// half-bit.
///
/// # Returns
/// * `Ok(None)` if the transmitter has not been set up yet (the timer is still
///   reloaded so the cadence is kept)
/// * `Ok(Some(level))` with the level now on the line
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER1() {
///     let _ = global_tx_tick(&MANCHESTER_TX, &mut TIMER1_SOURCE);
/// }
/// ```
pub fn global_tx_tick<TX: OutputPin, T: TickSource>(
    global_tx: &'static GlobalTx<TX>,
    source: &mut T,
) -> Result<Option<Level>, TxError> {
    critical_section::with(|cs| match global_tx.borrow(cs).borrow_mut().as_mut() {
        Some(driver) => service_tick(source, driver).map(Some),
        None => {
            source.reload();
            source.clear_pending();
            Ok(None)
        }
    })
}

/// Requests a frame on the shared transmitter.
///
/// The four framing fields are written inside one critical section, so the tick
/// handler never observes a half-made request.
///
/// # Errors
/// - [`TxError::Busy`] if a frame is still in flight
/// - [`TxError::NotInitialized`] before [`global_tx_setup`]
pub fn global_request_transmission<TX: OutputPin>(
    global_tx: &'static GlobalTx<TX>,
    byte: u8,
) -> Result<(), TxError> {
    critical_section::with(|cs| match global_tx.borrow(cs).borrow_mut().as_mut() {
        Some(driver) => driver.request_transmission(byte),
        None => Err(TxError::NotInitialized),
    })
}

/// Non-blocking request on the shared transmitter.
///
/// Returns `WouldBlock` while the previous frame is in flight, so a main loop can wait
/// with `nb::block!` without ever holding the critical section across ticks.
///
/// # Example
/// ```rust,ignore
/// loop {
///     delay.delay_ms(1_000);
///     nb::block!(global_try_request(&MANCHESTER_TX, 0b1011_0010)).unwrap();
///     delay.delay_ms(1_500);
/// }
/// ```
pub fn global_try_request<TX: OutputPin>(
    global_tx: &'static GlobalTx<TX>,
    byte: u8,
) -> nb::Result<(), TxError> {
    critical_section::with(|cs| match global_tx.borrow(cs).borrow_mut().as_mut() {
        Some(driver) => driver.try_request(byte),
        None => Err(nb::Error::Other(TxError::NotInitialized)),
    })
}

/// Current mode of the shared transmitter, `None` before setup.
pub fn global_tx_state<TX: OutputPin>(global_tx: &'static GlobalTx<TX>) -> Option<TxState> {
    critical_section::with(|cs| global_tx.borrow(cs).borrow().as_ref().map(|d| d.state()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICKS_PER_FRAME_USIZE;
    use crate::timer::tests::{Event, MockTimer};
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::io::ErrorKind as IoErrorKind;

    fn finish(global_tx: &'static GlobalTx<PinMock>) {
        critical_section::with(|cs| {
            if let Some(driver) = global_tx.borrow(cs).borrow_mut().as_mut() {
                driver.tx.done();
            }
        });
    }

    #[test]
    fn test_global_tick_before_setup_keeps_cadence() {
        static TX: GlobalTx<PinMock> = global_tx_init::<PinMock>();
        let mut timer = MockTimer::default();

        assert_eq!(global_tx_tick(&TX, &mut timer), Ok(None));
        assert_eq!(timer.events[..2], [Some(Event::Reload), Some(Event::Clear)]);
        assert_eq!(global_tx_state(&TX), None);
        assert_eq!(
            global_request_transmission(&TX, 0x01),
            Err(TxError::NotInitialized)
        );
        assert_eq!(
            global_try_request(&TX, 0x01),
            Err(nb::Error::Other(TxError::NotInitialized))
        );
    }

    #[test]
    fn test_global_frame() {
        static TX: GlobalTx<PinMock> = global_tx_init::<PinMock>();
        let frame = [
            0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, // 0xFF
            1, 0, 1, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 1, 0, 1, // 0x0F
        ];
        let expectations: [PinTransaction; TICKS_PER_FRAME_USIZE + 2] =
            core::array::from_fn(|i| match i {
                1..=32 if frame[i - 1] == 1 => PinTransaction::set(PinState::High),
                _ => PinTransaction::set(PinState::Low),
            });
        global_tx_setup(&TX, PinMock::new(&expectations)).unwrap();
        assert_eq!(global_tx_state(&TX), Some(TxState::Idle));

        assert_eq!(global_request_transmission(&TX, 0x0F), Ok(()));
        assert_eq!(global_try_request(&TX, 0x0E), Err(nb::Error::WouldBlock));
        assert_eq!(global_request_transmission(&TX, 0x0E), Err(TxError::Busy));

        let mut timer = MockTimer::default();
        for tick in 0..TICKS_PER_FRAME_USIZE {
            let expected = if frame[tick] == 1 {
                Level::High
            } else {
                Level::Low
            };
            assert_eq!(global_tx_tick(&TX, &mut timer), Ok(Some(expected)));
            timer.count = 0;
        }
        assert_eq!(global_tx_state(&TX), Some(TxState::Idle));
        assert_eq!(global_tx_tick(&TX, &mut timer), Ok(Some(Level::Low)));
        finish(&TX);
    }

    #[test]
    fn test_failed_setup_leaves_global_empty() {
        static TX: GlobalTx<PinMock> = global_tx_init::<PinMock>();
        let mut pin = PinMock::new(&[
            PinTransaction::set(PinState::Low).with_error(MockError::Io(IoErrorKind::Other))
        ]);

        assert_eq!(
            global_tx_setup(&TX, pin.clone()),
            Err(TxError::Pin(ErrorKind::Other))
        );
        assert_eq!(global_tx_state(&TX), None);

        let mut timer = MockTimer::default();
        assert_eq!(global_tx_tick(&TX, &mut timer), Ok(None));
        pin.done();
    }
}
