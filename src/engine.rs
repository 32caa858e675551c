//! The transfer engine: frame sources in, a timer/DMA waveform out.
//!
//! An [`Engine`] drives up to 16 WS2812B strips, one per line of a GPIO port, all
//! clocked by one timer. Two LEDs of bit data live in a [`BitBuffer`] ring; while the DMA
//! streams one half, the interrupt handlers refill the other from each channel's
//! [`FrameSource`](crate::frame_source::FrameSource). After exactly `LEDS` pixels per
//! channel the engine holds every line low for the latch pulse and becomes idle.
//!
//! ```text
//!            request_transfer + poll
//!  Idle ---------------------------------> Streaming
//!   ^                                        |  half / complete: refill other pair
//!   |                                        |  led_index == LEDS
//!   |       reset elapsed                    v
//!   +------------------- ResetPulse <---- AllLedsSent
//! ```
//!
//! Every session programs the port in the same order:
//!
//! | Step            | Port operations                                                          |
//! |-----------------|--------------------------------------------------------------------------|
//! | construction    | period, data-latch compare, force-low compare, reload, stop, lines low   |
//! | session start   | arm DMA, DMA requests on, counter = `bit_period - 1`, start              |
//! | all LEDs sent   | stop, disarm DMA, DMA requests off                                       |
//! | reset pulse     | period = reset, counter = 0, reload, update interrupt on, start, lines low |
//! | reset elapsed   | stop, update interrupt off, period = bit period, reload                  |
//!
//! The half-transfer and transfer-complete interrupts come from the force-low stream
//! ([`RING_INTERRUPT_STREAM`](crate::waveform_port::RING_INTERRUPT_STREAM)), after `t1`
//! of the last word of a slot pair. Every line is low by then and the next update event
//! is still a bit-period tail away, so the session can stop the timer from the
//! transfer-complete handler without shortening the final bit.
//!
//! The ring is read by DMA straight out of the engine, so an engine must not move while a
//! session is streaming. Keep it in a `static` [`SharedEngine`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ws2812_parallel::engine::{Engine, EngineConfig};
//! use ws2812_parallel::waveform_port::WaveformPort;
//!
//! fn show<P: WaveformPort>(port: P) -> ws2812_parallel::Result<()> {
//!     // 4 strips of 60 LEDs on a 72 MHz timer.
//!     let mut engine: Engine<P, 4, 60> = Engine::new(port, EngineConfig::new(72_000_000))?;
//!     engine.write_channel_frame(0, &[255, 0, 0, 0, 255, 0])?; // red, green, repeated
//!     engine.request_transfer();
//!     engine.poll();
//!     Ok(())
//! }
//! ```

mod shared_engine;

pub use shared_engine::SharedEngine;

use smart_leds::RGB8;

use crate::bit_buffer::{BitBuffer, MAX_CHANNELS, SlotPair};
use crate::encoder::{ENCODE_STRATEGY_DEFAULT, EncodeStrategy, encode_blank, encode_pixel};
use crate::fmt::{debug, error, info, trace, warning};
use crate::frame_source::FrameSources;
use crate::gamma::{GAMMA_DEFAULT, Gamma};
use crate::timing::{BIT_RATE_HZ_DEFAULT, MIN_RESET_US_DEFAULT, Timing};
use crate::waveform_port::{CompareEvent, WaveformPort};
use crate::{Error, Result};

/// Build-time settings for an [`Engine`].
///
/// Only the timer clock is required; everything else has a protocol default.
///
/// ```rust
/// use ws2812_parallel::encoder::EncodeStrategy;
/// use ws2812_parallel::engine::EngineConfig;
/// use ws2812_parallel::gamma::Gamma;
///
/// let config = EngineConfig::new(168_000_000)
///     .with_gamma(Gamma::Gamma2_2)
///     .with_encode_strategy(EncodeStrategy::Unrolled)
///     .with_min_reset_us(80);
/// assert_eq!(config.min_reset_us(), 80);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    timer_clock_hz: u32,
    bit_rate_hz: u32,
    min_reset_us: u32,
    gamma: Gamma,
    encode_strategy: EncodeStrategy,
}

impl EngineConfig {
    /// Defaults for a timer clocked at `timer_clock_hz`.
    #[must_use]
    pub const fn new(timer_clock_hz: u32) -> Self {
        Self {
            timer_clock_hz,
            bit_rate_hz: BIT_RATE_HZ_DEFAULT,
            min_reset_us: MIN_RESET_US_DEFAULT,
            gamma: GAMMA_DEFAULT,
            encode_strategy: ENCODE_STRATEGY_DEFAULT,
        }
    }

    /// Override the protocol bit rate.
    #[must_use]
    pub const fn with_bit_rate_hz(mut self, bit_rate_hz: u32) -> Self {
        self.bit_rate_hz = bit_rate_hz;
        self
    }

    /// Override the latch pulse length (at least 50 us).
    #[must_use]
    pub const fn with_min_reset_us(mut self, min_reset_us: u32) -> Self {
        self.min_reset_us = min_reset_us;
        self
    }

    /// Override the gamma curve.
    #[must_use]
    pub const fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// Override the refill encoding strategy.
    #[must_use]
    pub const fn with_encode_strategy(mut self, encode_strategy: EncodeStrategy) -> Self {
        self.encode_strategy = encode_strategy;
        self
    }

    /// Timer input clock in Hz.
    #[must_use]
    pub const fn timer_clock_hz(&self) -> u32 {
        self.timer_clock_hz
    }

    /// Protocol bit rate in Hz.
    #[must_use]
    pub const fn bit_rate_hz(&self) -> u32 {
        self.bit_rate_hz
    }

    /// Latch pulse length in microseconds.
    #[must_use]
    pub const fn min_reset_us(&self) -> u32 {
        self.min_reset_us
    }

    /// Gamma curve.
    #[must_use]
    pub const fn gamma(&self) -> Gamma {
        self.gamma
    }

    /// Encoding strategy.
    #[must_use]
    pub const fn encode_strategy(&self) -> EncodeStrategy {
        self.encode_strategy
    }

    /// Derive the timer tick counts.
    ///
    /// # Errors
    ///
    /// See [`Timing::new`].
    pub fn timing(&self) -> Result<Timing> {
        Timing::new(self.timer_clock_hz, self.bit_rate_hz, self.min_reset_us)
    }
}

/// Where the engine is in a session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// No session. Lines are low.
    #[default]
    Idle,
    /// DMA is streaming the ring.
    Streaming,
    /// The last LED has been emitted; the timer and DMA are stopped.
    AllLedsSent,
    /// Lines are held low for the latch pulse.
    ResetPulse,
}

/// Progress counters of the current (or last) session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferSession {
    state: TransferState,
    active: bool,
    complete: bool,
    start_requested: bool,
    led_index: usize,
    pixels_loaded: usize,
    blank_loads: usize,
    ring_boundaries: usize,
}

impl TransferSession {
    /// Session state.
    #[must_use]
    pub const fn state(&self) -> TransferState {
        self.state
    }

    /// Whether a session is between its start and its latch pulse ending.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the last session ended with its latch pulse.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether a transfer has been requested but not yet started.
    #[must_use]
    pub const fn is_start_requested(&self) -> bool {
        self.start_requested
    }

    /// LEDs fully emitted this session.
    #[must_use]
    pub const fn led_index(&self) -> usize {
        self.led_index
    }

    /// Real pixels read from the frame sources this session (per channel).
    #[must_use]
    pub const fn pixels_loaded(&self) -> usize {
        self.pixels_loaded
    }

    /// Slot-pair loads that wrote dark pixels because every real pixel was already loaded.
    #[must_use]
    pub const fn blank_loads(&self) -> usize {
        self.blank_loads
    }

    /// Half-transfer and transfer-complete interrupts seen this session.
    #[must_use]
    pub const fn ring_boundaries(&self) -> usize {
        self.ring_boundaries
    }

    /// The slot pair the DMA is emitting, while streaming.
    ///
    /// Derived from the boundary count: the DMA starts on pair 0 and alternates at
    /// every boundary.
    #[must_use]
    pub const fn dma_reading(&self) -> Option<SlotPair> {
        if !matches!(self.state, TransferState::Streaming) {
            None
        } else if self.ring_boundaries % 2 == 0 {
            Some(SlotPair::First)
        } else {
            Some(SlotPair::Second)
        }
    }
}

/// Parallel WS2812B driver for `CHANNELS` strips of `LEDS` LEDs each.
///
/// See the [module documentation](mod@crate::engine).
pub struct Engine<P: WaveformPort, const CHANNELS: usize, const LEDS: usize> {
    port: P,
    timing: Timing,
    gamma: Gamma,
    encode_strategy: EncodeStrategy,
    ring: BitBuffer,
    sources: FrameSources<CHANNELS, LEDS>,
    session: TransferSession,
    fault: Option<Error>,
}

impl<P: WaveformPort, const CHANNELS: usize, const LEDS: usize> Engine<P, CHANNELS, LEDS> {
    /// Mask of the port lines this engine drives: bits `0..CHANNELS`.
    pub const LINES: u16 = lines_mask(CHANNELS);

    /// Validate the configuration, program the timer and park every line low.
    ///
    /// The new engine is idle and complete, with every channel unbound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelCountOutOfRange`] unless `1 <= CHANNELS <= 16`,
    /// [`Error::StripLengthZero`] if `LEDS` is zero, and the errors of [`Timing::new`].
    pub fn new(port: P, config: EngineConfig) -> Result<Self> {
        if CHANNELS == 0 || CHANNELS > MAX_CHANNELS {
            return Err(Error::ChannelCountOutOfRange {
                channel_count: CHANNELS,
            });
        }
        if LEDS == 0 {
            return Err(Error::StripLengthZero);
        }
        let timing = config.timing()?;

        let mut engine = Self {
            port,
            timing,
            gamma: config.gamma(),
            encode_strategy: config.encode_strategy(),
            ring: BitBuffer::new(),
            sources: FrameSources::new(),
            session: TransferSession {
                complete: true,
                ..TransferSession::default()
            },
            fault: None,
        };
        engine.configure_port();
        info!(
            "ws2812: {} channels x {} LEDs, bit period {} ticks (t0 {}, t1 {}), reset {} ticks",
            CHANNELS,
            LEDS,
            timing.bit_period(),
            timing.t0(),
            timing.t1(),
            timing.reset_period()
        );
        Ok(engine)
    }

    /// Copy `bytes` (`r, g, b, ...`) as `channel`'s frame.
    ///
    /// Intended for setup; identical to [`write_channel_frame`](Self::write_channel_frame).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransferActive`] while a session runs, otherwise the errors of
    /// [`FrameSources::bind_channel`].
    pub fn bind_channel(&mut self, channel: u8, bytes: &[u8]) -> Result<()> {
        self.ensure_inactive()?;
        self.sources.bind_channel(channel, bytes)?;
        debug!("ws2812: channel {} bound to {} pixels", channel, bytes.len() / 3);
        Ok(())
    }

    /// Replace `channel`'s frame before the next [`request_transfer`](Self::request_transfer).
    ///
    /// # Errors
    ///
    /// See [`bind_channel`](Self::bind_channel).
    pub fn write_channel_frame(&mut self, channel: u8, bytes: &[u8]) -> Result<()> {
        self.bind_channel(channel, bytes)
    }

    /// Replace `channel`'s frame with pixels from an iterator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransferActive`] while a session runs, otherwise the errors of
    /// [`FrameSources::bind_pixels`].
    pub fn write_channel_pixels<I>(&mut self, channel: u8, pixels: I) -> Result<()>
    where
        I: IntoIterator<Item = RGB8>,
    {
        self.ensure_inactive()?;
        self.sources.bind_pixels(channel, pixels)
    }

    /// Return `channel` to dark output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransferActive`] while a session runs and
    /// [`Error::ChannelOutOfRange`] for a bad channel.
    pub fn unbind_channel(&mut self, channel: u8) -> Result<()> {
        self.ensure_inactive()?;
        self.sources.unbind_channel(channel)
    }

    /// Ask for a session. The next [`poll`](Self::poll) starts it.
    ///
    /// Returns `false`, and changes nothing, while a session is active.
    pub fn request_transfer(&mut self) -> bool {
        if self.session.active {
            warning!("ws2812: transfer requested while active; ignored");
            return false;
        }
        self.session.start_requested = true;
        true
    }

    /// Start the requested session if none is active. Returns whether one started.
    pub fn poll(&mut self) -> bool {
        if !self.session.start_requested || self.session.active {
            return false;
        }
        self.begin_session();
        true
    }

    /// `true` once the last session's latch pulse has ended and no session is active.
    ///
    /// Reading it has no side effects.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.session.complete && !self.session.active
    }

    /// Whether a session is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.active
    }

    /// Whether the last session finished its latch pulse.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.session.complete
    }

    /// Session counters.
    #[must_use]
    pub const fn session(&self) -> &TransferSession {
        &self.session
    }

    /// The DMA ring.
    #[must_use]
    pub const fn ring(&self) -> &BitBuffer {
        &self.ring
    }

    /// Per-channel frames and cursors.
    #[must_use]
    pub const fn sources(&self) -> &FrameSources<CHANNELS, LEDS> {
        &self.sources
    }

    /// Derived tick counts.
    #[must_use]
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// The hardware port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// The hardware port, mutably.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Report (once) a DMA fault that aborted a session.
    ///
    /// Taking the fault marks the engine complete, so it is idle again and a new
    /// transfer can be requested.
    ///
    /// # Errors
    ///
    /// Returns the latched [`Error::DmaTransfer`], if any.
    pub fn take_fault(&mut self) -> Result<()> {
        match self.fault.take() {
            Some(fault) => {
                if !self.session.active {
                    self.session.complete = true;
                }
                Err(fault)
            }
            None => Ok(()),
        }
    }

    /// DMA half-transfer, raised after `t1` of the last word of slot pair 0: that LED is
    /// fully emitted and the DMA has moved on to pair 1, so refill pair 0.
    pub fn on_half_transfer(&mut self) {
        if self.session.state != TransferState::Streaming {
            trace!("ws2812: stray half-transfer");
            return;
        }
        self.session.ring_boundaries += 1;
        self.count_emitted_led();
        self.refill(SlotPair::First);
    }

    /// DMA transfer-complete, raised after `t1` of the last ring word: slot pair 1 has
    /// been emitted and every line is low. Refill it, or finish the session once every
    /// LED is out.
    pub fn on_transfer_complete(&mut self) {
        if self.session.state != TransferState::Streaming {
            trace!("ws2812: stray transfer-complete");
            return;
        }
        self.session.ring_boundaries += 1;
        self.count_emitted_led();
        if self.session.led_index == LEDS {
            self.finish_streaming();
            self.start_reset_pulse();
            return;
        }
        self.refill(SlotPair::Second);
    }

    /// Timer update during the latch pulse: the pulse is over and the engine is idle.
    pub fn on_reset_elapsed(&mut self) {
        if self.session.state != TransferState::ResetPulse {
            trace!("ws2812: stray timer update");
            return;
        }
        self.port.stop_timer();
        self.restore_bit_timer();

        self.session.state = TransferState::Idle;
        self.session.active = false;
        self.session.complete = true;
        debug!("ws2812: latch done, idle");
    }

    /// DMA transfer error: abort the session, park the lines low and latch the fault for
    /// [`take_fault`](Self::take_fault).
    ///
    /// An error during the latch pulse also puts the timer back on the bit period.
    pub fn on_transfer_error(&mut self) {
        if !self.session.active {
            return;
        }
        self.port.stop_timer();
        self.port.disarm_dma();
        self.port.set_dma_requests(false);
        if self.session.state == TransferState::ResetPulse {
            self.restore_bit_timer();
        }
        self.port.force_lines_low(Self::LINES);

        let led_index = self.session.led_index;
        self.session.state = TransferState::Idle;
        self.session.active = false;
        self.fault = Some(Error::DmaTransfer { led_index });
        error!("ws2812: DMA transfer error after {} LEDs", led_index);
    }

    fn ensure_inactive(&self) -> Result<()> {
        if self.session.active {
            return Err(Error::TransferActive);
        }
        Ok(())
    }

    fn configure_port(&mut self) {
        let timing = self.timing;
        self.port.set_timer_period(timing.bit_period());
        for event in [CompareEvent::DataLatch, CompareEvent::ForceLow] {
            self.port.set_compare(event, event.ticks(timing));
        }
        self.port.reload_timer();
        self.port.stop_timer();
        self.port.force_lines_low(Self::LINES);
    }

    fn begin_session(&mut self) {
        self.session = TransferSession {
            state: TransferState::Streaming,
            active: true,
            complete: false,
            start_requested: false,
            led_index: 0,
            pixels_loaded: 0,
            blank_loads: 0,
            ring_boundaries: 0,
        };
        self.sources.rewind_all();
        for pair in SlotPair::ALL {
            self.load_pair(pair);
        }

        self.port.arm_dma(self.ring.words(), Self::LINES);
        self.port.set_dma_requests(true);
        self.port.set_counter(self.timing.preload_count());
        self.port.start_timer();
        debug!("ws2812: session start");
    }

    fn count_emitted_led(&mut self) {
        if self.session.led_index < LEDS {
            self.session.led_index += 1;
        }
    }

    /// Reload `pair`, which the interrupt just reported as emitted.
    ///
    /// The pair the DMA is on comes from the boundary count, not from the interrupt kind,
    /// so a lost or duplicated interrupt trips the check.
    fn refill(&mut self, pair: SlotPair) {
        debug_assert_ne!(
            self.session.dma_reading(),
            Some(pair),
            "refilling the slot pair the DMA is emitting"
        );
        self.load_pair(pair);
    }

    /// Load the next real pixel of every channel into `pair`, or a dark pixel once each
    /// channel has supplied `LEDS` pixels.
    fn load_pair(&mut self, pair: SlotPair) {
        let strategy = self.encode_strategy;
        if self.session.pixels_loaded < LEDS {
            let gamma = self.gamma;
            for (channel, source) in self.sources.iter_mut() {
                let pixel = source.next_pixel();
                encode_pixel(&mut self.ring, strategy, gamma, channel, pair, pixel);
            }
            self.session.pixels_loaded += 1;
        } else {
            for channel in channels::<CHANNELS>() {
                encode_blank(&mut self.ring, strategy, channel, pair);
            }
            self.session.blank_loads += 1;
        }
    }

    fn finish_streaming(&mut self) {
        self.session.state = TransferState::AllLedsSent;
        self.port.stop_timer();
        self.port.disarm_dma();
        self.port.set_dma_requests(false);
        debug!("ws2812: {} LEDs sent", self.session.led_index);
    }

    fn restore_bit_timer(&mut self) {
        self.port.set_update_interrupt(false);
        self.port.set_timer_period(self.timing.bit_period());
        self.port.reload_timer();
    }

    fn start_reset_pulse(&mut self) {
        self.session.state = TransferState::ResetPulse;
        self.port.set_timer_period(self.timing.reset_period());
        self.port.set_counter(0);
        self.port.reload_timer();
        self.port.set_update_interrupt(true);
        self.port.start_timer();
        self.port.force_lines_low(Self::LINES);
    }
}

const fn lines_mask(channels: usize) -> u16 {
    if channels >= MAX_CHANNELS {
        u16::MAX
    } else {
        (1u16 << channels) - 1
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "channel counts are validated to 1..=16 in Engine::new"
)]
fn channels<const CHANNELS: usize>() -> impl Iterator<Item = u8> {
    0..CHANNELS.min(MAX_CHANNELS) as u8
}
