//! Logging shims.
//!
//! Forwards to `defmt` when `defmt-0-3` is enabled, otherwise to `log` when `log` is
//! enabled. With neither feature the arguments are only borrowed, so call sites compile
//! to nothing.

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
            ::log::trace!($s $(, $x)*);
            $(
                #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
                let _ = & $x;
            )*
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
            ::log::debug!($s $(, $x)*);
            $(
                #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
                let _ = & $x;
            )*
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
            ::log::warn!($s $(, $x)*);
            $(
                #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
                let _ = & $x;
            )*
        }
    };
}
