//! Logging macros that forward to `defmt` on target and compile away on the host.
//!
//! Host test binaries do not link a `defmt` global logger, so the `host` feature
//! turns every call into a no-op that still type-checks its arguments. The warning
//! level is spelled `warning!` because `warn` collides with the built-in lint attribute.
#![allow(unused_macros, reason = "not every level is used in every build")]

#[cfg(all(feature = "defmt", not(feature = "host")))]
macro_rules! trace {
    ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "host")))]
macro_rules! debug {
    ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "host")))]
macro_rules! info {
    ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "host")))]
macro_rules! warning {
    ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "host")))]
macro_rules! error {
    ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
}

#[cfg(not(all(feature = "defmt", not(feature = "host"))))]
macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(all(feature = "defmt", not(feature = "host"))))]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(all(feature = "defmt", not(feature = "host"))))]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(all(feature = "defmt", not(feature = "host"))))]
macro_rules! warning {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(all(feature = "defmt", not(feature = "host"))))]
macro_rules! error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

pub(crate) use {debug, error, info, trace, warning};
