#![cfg(feature = "host")]
//! A [`WaveformPort`] that records register traffic instead of touching hardware.
//!
//! `HostPort` logs every call as a [`PortEvent`], keeps a copy of the ring words each time
//! the DMA is armed, and can replay slot words through the timer model to recover the
//! pulse widths a strip would see.

use heapless::Vec;
use smart_leds::RGB8;

use crate::bit_buffer::{ColorLane, RING_SLOTS, SlotPair, channel_mask, slot_index};
use crate::timing::Timing;
use crate::waveform_port::{CompareEvent, WaveformPort};

/// Events kept before the oldest are dropped.
pub const PORT_EVENT_CAPACITY: usize = 128;

/// One recorded [`WaveformPort`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PortEvent {
    /// [`WaveformPort::set_timer_period`].
    TimerPeriod(u32),
    /// [`WaveformPort::set_compare`].
    Compare(CompareEvent, u32),
    /// [`WaveformPort::set_counter`].
    Counter(u32),
    /// [`WaveformPort::reload_timer`].
    TimerReload,
    /// [`WaveformPort::start_timer`].
    TimerStart,
    /// [`WaveformPort::stop_timer`].
    TimerStop,
    /// [`WaveformPort::arm_dma`].
    DmaArmed {
        /// Line mask given to the update and force-low streams.
        lines: u16,
    },
    /// [`WaveformPort::disarm_dma`].
    DmaDisarmed,
    /// [`WaveformPort::set_dma_requests`].
    DmaRequests(bool),
    /// [`WaveformPort::set_update_interrupt`].
    UpdateInterrupt(bool),
    /// [`WaveformPort::force_lines_low`].
    LinesLow(u16),
}

/// Recording port for host tests.
#[derive(Clone, Debug, Default)]
pub struct HostPort {
    events: Vec<PortEvent, PORT_EVENT_CAPACITY>,
    armed_ring: Option<[u16; RING_SLOTS]>,
    timer_period: u32,
    timer_running: bool,
    dma_armed: bool,
    dma_requests: bool,
    update_interrupt: bool,
}

impl HostPort {
    /// A port with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls, oldest first.
    #[must_use]
    pub fn events(&self) -> &[PortEvent] {
        &self.events
    }

    /// Forget the recorded calls.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Ring words captured by the last [`WaveformPort::arm_dma`].
    #[must_use]
    pub const fn armed_ring(&self) -> Option<&[u16; RING_SLOTS]> {
        self.armed_ring.as_ref()
    }

    /// Current auto-reload value.
    #[must_use]
    pub const fn timer_period(&self) -> u32 {
        self.timer_period
    }

    /// Whether the timer is counting.
    #[must_use]
    pub const fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// Whether the DMA streams are armed.
    #[must_use]
    pub const fn dma_armed(&self) -> bool {
        self.dma_armed
    }

    /// Whether the timer raises DMA requests.
    #[must_use]
    pub const fn dma_requests(&self) -> bool {
        self.dma_requests
    }

    /// Whether the timer update interrupt is enabled.
    #[must_use]
    pub const fn update_interrupt(&self) -> bool {
        self.update_interrupt
    }

    fn record(&mut self, event: PortEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }
        let _ = self.events.push(event);
    }
}

impl WaveformPort for HostPort {
    fn set_timer_period(&mut self, ticks: u32) {
        self.timer_period = ticks;
        self.record(PortEvent::TimerPeriod(ticks));
    }

    fn set_compare(&mut self, event: CompareEvent, ticks: u32) {
        self.record(PortEvent::Compare(event, ticks));
    }

    fn set_counter(&mut self, ticks: u32) {
        self.record(PortEvent::Counter(ticks));
    }

    fn reload_timer(&mut self) {
        self.record(PortEvent::TimerReload);
    }

    fn start_timer(&mut self) {
        self.timer_running = true;
        self.record(PortEvent::TimerStart);
    }

    fn stop_timer(&mut self) {
        self.timer_running = false;
        self.record(PortEvent::TimerStop);
    }

    fn arm_dma(&mut self, ring: &[u16; RING_SLOTS], lines: u16) {
        self.armed_ring = Some(*ring);
        self.dma_armed = true;
        self.record(PortEvent::DmaArmed { lines });
    }

    fn disarm_dma(&mut self) {
        self.dma_armed = false;
        self.record(PortEvent::DmaDisarmed);
    }

    fn set_dma_requests(&mut self, enabled: bool) {
        self.dma_requests = enabled;
        self.record(PortEvent::DmaRequests(enabled));
    }

    fn set_update_interrupt(&mut self, enabled: bool) {
        self.update_interrupt = enabled;
        self.record(PortEvent::UpdateInterrupt(enabled));
    }

    fn force_lines_low(&mut self, lines: u16) {
        self.record(PortEvent::LinesLow(lines));
    }
}

/// Ticks `channel` stays high during the bit period that emits `slot_word`.
///
/// The update event raises every line in `lines`; the data-latch event lowers the lines
/// whose bit is set in `slot_word`; the force-low event lowers the rest. Lines outside
/// `lines` never go high.
#[must_use]
pub fn line_high_ticks(slot_word: u16, channel: u8, lines: u16, timing: Timing) -> u32 {
    let Some(mask) = channel_mask(channel) else {
        return 0;
    };
    if lines & mask == 0 {
        0
    } else if slot_word & mask != 0 {
        timing.t0()
    } else {
        timing.t1()
    }
}

/// Lines of `lines` that are high `tick` ticks into the bit period emitting `slot_word`.
///
/// Lines rise at tick 0, lines set in `slot_word` fall at `t0` and the rest fall at `t1`.
#[must_use]
pub fn lines_high_at(slot_word: u16, lines: u16, timing: Timing, tick: u32) -> u16 {
    if tick < timing.t0() {
        lines
    } else if tick < timing.t1() {
        lines & !slot_word
    } else {
        0
    }
}

/// The gamma-corrected color a strip on `channel` would latch from one slot pair,
/// recovered from pulse widths.
#[must_use]
pub fn decode_wire_pixel(
    ring: &[u16; RING_SLOTS],
    pair: SlotPair,
    channel: u8,
    lines: u16,
    timing: Timing,
) -> RGB8 {
    let lane_byte = |lane: ColorLane| {
        (0..8).fold(0u8, |byte, bit| {
            let word = ring.get(slot_index(pair, lane, bit)).copied().unwrap_or(0);
            let high = line_high_ticks(word, channel, lines, timing);
            (byte << 1) | u8::from(timing.decode_pulse(high))
        })
    };
    RGB8::new(
        lane_byte(ColorLane::Red),
        lane_byte(ColorLane::Green),
        lane_byte(ColorLane::Blue),
    )
}
