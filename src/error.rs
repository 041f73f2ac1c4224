//! Error type shared by the encoder, the pin driver and the ISR helpers.

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Everything that can go wrong while requesting or clocking out a frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxError {
    /// A frame is still being clocked out; the request was dropped and the
    /// running transmission is unaffected.
    #[error("a transmission is already in progress")]
    Busy,
    /// The output pin reported a fault while being driven.
    #[error("the output line could not be driven: {0:?}")]
    Pin(ErrorKind),
    /// A global helper was used before the shared transmitter was set up.
    #[error("the shared transmitter has not been set up")]
    NotInitialized,
}
