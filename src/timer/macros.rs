/// Declares a static global `MANCHESTER_TX` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `MANCHESTER_TX` suitable for use in
/// interrupt-based environments, where both the main thread and an ISR need
/// to safely access the shared transmitter.
///
/// # Arguments
/// - `$tx`: The concrete type of the TX pin (must implement `OutputPin`)
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::digital::Mock as MyTxPinType;
/// manchester_ook::init_manchester_tx!(MyTxPinType);
/// ```
#[macro_export]
macro_rules! init_manchester_tx {
    ( $tx:ty ) => {
        pub static MANCHESTER_TX: $crate::timer::GlobalTx<$tx> =
            $crate::timer::global_tx_init::<$tx>();
    };
}

/// Initializes the global `MANCHESTER_TX` singleton with a new transmitter.
///
/// Expands to a call to [`global_tx_setup`](crate::timer::global_tx_setup) and evaluates
/// to its `Result`.
///
/// # Arguments
/// - `$tx`: The TX pin (must implement `OutputPin`)
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_manchester_tx!(tx).unwrap();
/// }
/// ```
///
/// # Notes
/// - Requires `init_manchester_tx!` to have been used earlier.
#[macro_export]
macro_rules! setup_manchester_tx {
    ( $tx:expr ) => {
        $crate::timer::global_tx_setup(&MANCHESTER_TX, $tx)
    };
}

/// Runs the tick handler on the global `MANCHESTER_TX` if it has been initialized.
///
/// This macro is intended to be invoked from the timer ISR. It reloads and acknowledges
/// the given [`TickSource`](crate::timer::TickSource) before advancing the encoder.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER1() {
///     tick_manchester_tx!(&mut TIMER1_SOURCE);
/// }
/// ```
///
/// # Notes
/// - This macro assumes `MANCHESTER_TX` was declared with `init_manchester_tx!`
///   and initialized via `setup_manchester_tx!`.
/// - Safe to call before setup; the timer is reloaded and nothing else happens.
/// - Pin errors are discarded, there is nobody to report them to in an ISR.
#[macro_export]
macro_rules! tick_manchester_tx {
    ( $source:expr ) => {{
        let _ = $crate::timer::global_tx_tick(&MANCHESTER_TX, $source);
    }};
}

/// Requests a frame on the global `MANCHESTER_TX`.
///
/// Evaluates to the `Result` of
/// [`global_request_transmission`](crate::timer::global_request_transmission).
///
/// # Example
/// ```rust,ignore
/// request_manchester_tx!(0b1011_0010).ok();
/// ```
#[macro_export]
macro_rules! request_manchester_tx {
    ( $byte:expr ) => {
        $crate::timer::global_request_transmission(&MANCHESTER_TX, $byte)
    };
}

#[cfg(test)]
mod tests {
    use crate::encoder::{Level, TxState};
    use crate::error::TxError;
    use crate::timer::global_tx_state;
    use crate::timer::tests::MockTimer;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    init_manchester_tx!(PinMock);

    #[test]
    fn test_macros_drive_shared_transmitter() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        setup_manchester_tx!(pin).unwrap();
        assert_eq!(request_manchester_tx!(0xAA), Ok(()));
        assert_eq!(request_manchester_tx!(0xAB), Err(TxError::Busy));

        let mut timer = MockTimer::default();
        tick_manchester_tx!(&mut timer);
        tick_manchester_tx!(&mut timer);
        assert_eq!(timer.count, 4);
        assert_eq!(global_tx_state(&MANCHESTER_TX), Some(TxState::Preamble));

        critical_section::with(|cs| {
            if let Some(driver) = MANCHESTER_TX.borrow(cs).borrow_mut().as_mut() {
                assert_eq!(driver.output(), Level::High);
                driver.tx.done();
            }
        });
    }
}
