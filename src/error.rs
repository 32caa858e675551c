use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Every variant except [`Error::TransferActive`], [`Error::DmaTransfer`] and
/// [`Error::EngineNotInitialized`] is a configuration error: it is detected when a channel
/// is bound or the engine is built, and the driver does not start.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Channel id is not below the engine's channel count.
    #[display("channel {channel} is out of range (engine drives {channel_count} channels)")]
    ChannelOutOfRange {
        /// Requested channel id.
        channel: u8,
        /// Number of channels the engine was built with.
        channel_count: u8,
    },

    /// Frame byte length is not a whole number of RGB triples.
    #[display("frame length {len} is not a multiple of 3")]
    FrameLengthNotMultipleOfThree {
        /// Rejected byte length.
        len: usize,
    },

    /// Frame holds no pixels.
    #[display("frame is empty")]
    FrameEmpty,

    /// Frame holds more pixels than the strip has LEDs.
    #[display("frame has {pixels} pixels but the strip has {leds} LEDs")]
    FrameTooLong {
        /// Pixels in the rejected frame.
        pixels: usize,
        /// Strip length.
        leds: usize,
    },

    /// Strip length is zero.
    #[display("strip length must be at least one LED")]
    StripLengthZero,

    /// Channel count must fit in one 16-bit half of the port set/reset register.
    #[display("channel count {channel_count} is outside 1..=16")]
    ChannelCountOutOfRange {
        /// Rejected channel count.
        channel_count: usize,
    },

    /// The timer clock cannot resolve `0 < t0 < t1 < bit_period`.
    #[display("timer clock {timer_clock_hz} Hz is too slow for {bit_rate_hz} Hz bits")]
    TimerClockTooSlow {
        /// Timer input clock.
        timer_clock_hz: u32,
        /// Requested protocol bit rate.
        bit_rate_hz: u32,
    },

    /// Bit rate is zero or the reset pulse is shorter than the protocol minimum.
    #[display("bit rate must be non-zero and reset pulse at least 50 us")]
    InvalidTiming,

    /// A frame write was attempted while a session is streaming.
    #[display("a transfer is in progress")]
    TransferActive,

    /// The DMA controller reported a transfer fault; the session was aborted.
    #[display("DMA transfer error after {led_index} LEDs")]
    DmaTransfer {
        /// LEDs fully emitted before the fault.
        led_index: usize,
    },

    /// A [`SharedEngine`](crate::engine::SharedEngine) was used before an engine was installed.
    #[display("shared engine has not been initialized")]
    EngineNotInitialized,
}
