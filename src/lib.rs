//! # manchester-ook
//!
//! A portable, no_std Rust driver that turns a single digital output pin into a
//! Manchester-encoded OOK transmitter, driven one half-bit at a time from a periodic
//! timer interrupt.
//!
//! Every transmission is a fixed two-byte frame:
//!
//! | Ticks   | Content                         |
//! |---------|---------------------------------|
//! | 1 - 16  | sync preamble `0xFF`, MSB first |
//! | 17 - 32 | payload byte, MSB first         |
//!
//! Each bit occupies two ticks. The first half is the inverted bit value and the second
//! half is its complement, so a `0` goes HIGH then LOW and a `1` goes LOW then HIGH.
//! Between frames the line is held LOW.
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for tick timing |
//! | `timer-isr` (default) | Uses `critical_section::with` to share the transmitter with a timer ISR |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use manchester_ook::driver::ManchesterTx;
//! use manchester_ook::encoder::Level;
//!
//! # let mut expectations = vec![PinTransaction::set(PinState::Low)];
//! # expectations.extend((0..33).map(|i| {
//! #     let high = match i {
//! #         0..16 => i % 2 == 1,
//! #         16..32 => i % 2 == 0,
//! #         _ => false,
//! #     };
//! #     PinTransaction::set(if high { PinState::High } else { PinState::Low })
//! # }));
//! # let pin = Pin::new(&expectations);
//! let mut tx = ManchesterTx::new(pin).unwrap();
//! tx.request_transmission(0x00).unwrap();
//! for _ in 0..32 {
//!     tx.tick().unwrap(); // Called every 5 ms by the timer interrupt
//! }
//! assert!(!tx.is_busy());
//! assert_eq!(tx.tick().unwrap(), Level::Low);
//! # tx.tx.done();
//! ```
//!
//! With a hardware timer, implement [`timer::TickSource`] for it and call
//! [`timer::service_tick`] (or `tick_manchester_tx!()` with the `timer-isr` feature)
//! from the interrupt handler.
//!
//! ## Integration Notes
//!
//! - The nominal tick is 5 ms, so the line runs at 100 bit/s and a frame lasts 160 ms
//! - A request made while a frame is in flight is rejected with [`error::TxError::Busy`]
//! - Only one transmitter instance should be active at a time in interrupt-driven mode
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

pub mod beacon;
pub mod consts;
pub mod decode;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod timer;
