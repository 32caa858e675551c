//! Bit-timer tick counts derived from the timer clock.
//!
//! Every bit period the timer raises three events:
//!
//! ```text
//!  update (tick 0)     data latch (t0)       force low (t1)        next update
//!  |                   |                     |                     |
//!  +-------------------+---------------------+                     +---
//!  | all lines high    | "0" lines drop here | "1" lines drop here |
//!  +                   +---------------------+---------------------+
//! ```
//!
//! With the default 800 kHz bit rate, `t0` is about 0.35 us and `t1` about 0.83 us
//! of a 1.25 us period, inside the WS2812B T0H and T1H windows.

use embassy_time::Duration;

use crate::bit_buffer::SLOTS_PER_LED;
use crate::{Error, Result};

/// WS2812B bit rate.
pub const BIT_RATE_HZ_DEFAULT: u32 = 800_000;

/// Default reset (latch) pulse length in microseconds.
pub const MIN_RESET_US_DEFAULT: u32 = 50;

/// Shortest reset pulse the protocol accepts, in microseconds.
pub const RESET_US_FLOOR: u32 = 50;

const MICROS_PER_SECOND: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Tick counts for one timer clock, bit rate and reset length.
///
/// Invariant: `0 < t0 < t1 < bit_period` and `reset_period` covers at least the requested
/// reset time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    timer_clock_hz: u32,
    bit_period: u32,
    t0: u32,
    t1: u32,
    reset_period: u32,
}

impl Timing {
    /// Derive tick counts.
    ///
    /// `bit_period = clock / bit_rate`, `t0 = 10 * bit_period / 36`,
    /// `t1 = 10 * bit_period / 15`, `reset_period = ceil(clock * reset_us / 1e6)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTiming`] if `bit_rate_hz` is zero or `min_reset_us` is below
    /// [`RESET_US_FLOOR`], and [`Error::TimerClockTooSlow`] if the clock cannot separate
    /// the three events.
    pub fn new(timer_clock_hz: u32, bit_rate_hz: u32, min_reset_us: u32) -> Result<Self> {
        if bit_rate_hz == 0 || min_reset_us < RESET_US_FLOOR {
            return Err(Error::InvalidTiming);
        }
        let bit_period = timer_clock_hz / bit_rate_hz;
        let t0 = scale(bit_period, 10, 36);
        let t1 = scale(bit_period, 10, 15);
        if !(0 < t0 && t0 < t1 && t1 < bit_period) {
            return Err(Error::TimerClockTooSlow {
                timer_clock_hz,
                bit_rate_hz,
            });
        }
        let reset_ticks = (u64::from(timer_clock_hz) * u64::from(min_reset_us))
            .div_ceil(MICROS_PER_SECOND);
        let reset_period = u32::try_from(reset_ticks).map_err(|_| Error::InvalidTiming)?;
        Ok(Self {
            timer_clock_hz,
            bit_period,
            t0,
            t1,
            reset_period,
        })
    }

    /// Timer input clock in Hz.
    #[must_use]
    pub const fn timer_clock_hz(self) -> u32 {
        self.timer_clock_hz
    }

    /// Ticks per data bit.
    #[must_use]
    pub const fn bit_period(self) -> u32 {
        self.bit_period
    }

    /// Tick at which lines carrying a "0" bit go low.
    #[must_use]
    pub const fn t0(self) -> u32 {
        self.t0
    }

    /// Tick at which every line goes low.
    #[must_use]
    pub const fn t1(self) -> u32 {
        self.t1
    }

    /// Ticks of the latch pulse.
    #[must_use]
    pub const fn reset_period(self) -> u32 {
        self.reset_period
    }

    /// Counter value that makes the first update event fire on the next tick.
    #[must_use]
    pub const fn preload_count(self) -> u32 {
        self.bit_period - 1
    }

    /// High time in ticks of a line sending `data_bit`.
    #[must_use]
    pub const fn high_ticks(self, data_bit: bool) -> u32 {
        if data_bit { self.t1 } else { self.t0 }
    }

    /// Data bit a receiver would read from a pulse `high_ticks` long.
    #[must_use]
    pub const fn decode_pulse(self, high_ticks: u32) -> bool {
        high_ticks > self.t0 + (self.t1 - self.t0) / 2
    }

    /// One bit period in nanoseconds, rounded down.
    #[must_use]
    pub fn bit_period_ns(self) -> u64 {
        ticks_to_ns(self.bit_period, self.timer_clock_hz)
    }

    /// The latch pulse as a duration, rounded up to whole microseconds.
    #[must_use]
    pub fn reset_duration(self) -> Duration {
        Duration::from_micros(ticks_to_us_ceil(u64::from(self.reset_period), self.timer_clock_hz))
    }

    /// Wire time of one full session: `leds` pixels plus the latch pulse.
    #[must_use]
    pub fn frame_duration(self, leds: usize) -> Duration {
        let bits = (leds as u64).saturating_mul(SLOTS_PER_LED as u64);
        let ticks = bits.saturating_mul(u64::from(self.bit_period));
        Duration::from_micros(ticks_to_us_ceil(ticks, self.timer_clock_hz)) + self.reset_duration()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "numerator is below denominator for the scale factors used"
)]
const fn scale(value: u32, numerator: u64, denominator: u64) -> u32 {
    (value as u64 * numerator / denominator) as u32
}

fn ticks_to_ns(ticks: u32, clock_hz: u32) -> u64 {
    u64::from(ticks) * NANOS_PER_SECOND / u64::from(clock_hz.max(1))
}

fn ticks_to_us_ceil(ticks: u64, clock_hz: u32) -> u64 {
    ticks
        .saturating_mul(MICROS_PER_SECOND)
        .div_ceil(u64::from(clock_hz.max(1)))
}
