//! The hardware seam: one bit timer, three DMA streams and one GPIO port.
//!
//! The engine owns the choreography (which register moves when); a [`WaveformPort`]
//! owns the registers. A board crate implements the trait for its timer/DMA/GPIO
//! instance and forwards the DMA half-transfer, transfer-complete and transfer-error
//! interrupts and the timer update interrupt to the engine.

use crate::bit_buffer::RING_SLOTS;
use crate::timing::Timing;

/// Compare channels of the bit timer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompareEvent {
    /// Fires at `t0`. Its DMA stream copies the next ring word to the port's reset
    /// register, pulling "0" lines low.
    DataLatch,
    /// Fires at `t1`. Its DMA stream writes the line mask to the reset register, pulling
    /// every line low.
    ForceLow,
}

impl CompareEvent {
    /// Tick within a bit period at which this event fires.
    #[must_use]
    pub const fn ticks(self, timing: Timing) -> u32 {
        match self {
            Self::DataLatch => timing.t0(),
            Self::ForceLow => timing.t1(),
        }
    }
}

/// The stream whose half-transfer and transfer-complete interrupts pace the refills.
///
/// It fires after `t1`, once every line of the word just emitted is low and before the
/// next update event raises them again, so stopping the timer from its handler never
/// cuts a pulse short.
pub const RING_INTERRUPT_STREAM: CompareEvent = CompareEvent::ForceLow;

/// Register-level operations the engine needs from the target.
///
/// Every method must be callable from interrupt context and must not block.
pub trait WaveformPort {
    /// Set the timer auto-reload so one period lasts `ticks`.
    fn set_timer_period(&mut self, ticks: u32);

    /// Set the tick at which `event` fires.
    fn set_compare(&mut self, event: CompareEvent, ticks: u32);

    /// Load the timer's counter.
    fn set_counter(&mut self, ticks: u32);

    /// Force an update so shadowed period and compare values take effect, then clear
    /// the update flag the forced update raised.
    fn reload_timer(&mut self);

    /// Start counting.
    fn start_timer(&mut self);

    /// Stop counting.
    fn stop_timer(&mut self);

    /// Arm the three circular DMA streams and clear their pending flags.
    ///
    /// - update: `lines` to the port set register,
    /// - [`CompareEvent::DataLatch`]: `ring`, one word per bit period, to the reset register,
    /// - [`CompareEvent::ForceLow`]: `lines` to the reset register.
    ///
    /// All three streams are circular over `RING_SLOTS` transfers. Only the
    /// [`RING_INTERRUPT_STREAM`] (force-low) stream raises interrupts: half-transfer after
    /// `t1` of word `RING_SLOTS / 2 - 1` and transfer-complete after `t1` of the last word.
    /// The data-latch stream must not raise them, since at `t0` a "1" bit is still high.
    fn arm_dma(&mut self, ring: &[u16; RING_SLOTS], lines: u16);

    /// Disable the three DMA streams.
    fn disarm_dma(&mut self);

    /// Enable or disable the timer's DMA requests (update and both compares).
    ///
    /// The engine enables requests only after [`arm_dma`](Self::arm_dma).
    fn set_dma_requests(&mut self, enabled: bool);

    /// Enable or disable the timer update interrupt.
    fn set_update_interrupt(&mut self, enabled: bool);

    /// Drive `lines` low through the reset register.
    fn force_lines_low(&mut self, lines: u16);
}

impl<P: WaveformPort + ?Sized> WaveformPort for &mut P {
    fn set_timer_period(&mut self, ticks: u32) {
        (**self).set_timer_period(ticks);
    }

    fn set_compare(&mut self, event: CompareEvent, ticks: u32) {
        (**self).set_compare(event, ticks);
    }

    fn set_counter(&mut self, ticks: u32) {
        (**self).set_counter(ticks);
    }

    fn reload_timer(&mut self) {
        (**self).reload_timer();
    }

    fn start_timer(&mut self) {
        (**self).start_timer();
    }

    fn stop_timer(&mut self) {
        (**self).stop_timer();
    }

    fn arm_dma(&mut self, ring: &[u16; RING_SLOTS], lines: u16) {
        (**self).arm_dma(ring, lines);
    }

    fn disarm_dma(&mut self) {
        (**self).disarm_dma();
    }

    fn set_dma_requests(&mut self, enabled: bool) {
        (**self).set_dma_requests(enabled);
    }

    fn set_update_interrupt(&mut self, enabled: bool) {
        (**self).set_update_interrupt(enabled);
    }

    fn force_lines_low(&mut self, lines: u16) {
        (**self).force_lines_low(lines);
    }
}
