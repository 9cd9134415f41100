// Adapted from esp-hal: https://github.com/esp-rs/esp-hal/blob/main/esp-hal/src/fmt.rs

//! Logging shims. Forward to `log` or `defmt` depending on the enabled feature,
//! and discard the arguments when neither is enabled.

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::trace!($s $(, $x)*);
                } else if #[cfg(feature = "defmt-03")] {
                    ::defmt::trace!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::debug!($s $(, $x)*);
                } else if #[cfg(feature = "defmt-03")] {
                    ::defmt::debug!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::warn!($s $(, $x)*);
                } else if #[cfg(feature = "defmt-03")] {
                    ::defmt::warn!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}
