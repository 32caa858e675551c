use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};
use smart_leds::RGB8;

use super::Engine;
use crate::fmt::warning;
use crate::waveform_port::WaveformPort;
use crate::{Error, Result};

/// An [`Engine`] shared between thread mode and the DMA/timer interrupt handlers.
///
/// Every access runs inside a critical section, so a refill never races a frame write.
/// Place it in a `static`, install the engine once at startup, and call the `on_*`
/// methods from the interrupt handlers.
///
/// ```rust,no_run
/// # use ws2812_parallel::waveform_port::{CompareEvent, WaveformPort};
/// # struct Tim1Port;
/// # impl WaveformPort for Tim1Port {
/// #     fn set_timer_period(&mut self, _: u32) {}
/// #     fn set_compare(&mut self, _: CompareEvent, _: u32) {}
/// #     fn set_counter(&mut self, _: u32) {}
/// #     fn reload_timer(&mut self) {}
/// #     fn start_timer(&mut self) {}
/// #     fn stop_timer(&mut self) {}
/// #     fn arm_dma(&mut self, _: &[u16; 48], _: u16) {}
/// #     fn disarm_dma(&mut self) {}
/// #     fn set_dma_requests(&mut self, _: bool) {}
/// #     fn set_update_interrupt(&mut self, _: bool) {}
/// #     fn force_lines_low(&mut self, _: u16) {}
/// # }
/// use ws2812_parallel::engine::{Engine, EngineConfig, SharedEngine};
///
/// static STRIPS: SharedEngine<Tim1Port, 4, 60> = SharedEngine::new();
///
/// // DMA stream interrupt:
/// fn dma_stream_irq(half: bool) {
///     if half {
///         STRIPS.on_half_transfer();
///     } else {
///         STRIPS.on_transfer_complete();
///     }
/// }
///
/// async fn show() -> ws2812_parallel::Result<()> {
///     STRIPS.install(Engine::new(Tim1Port, EngineConfig::new(72_000_000))?)?;
///     STRIPS.write_channel_frame(0, &[255, 0, 0])?;
///     STRIPS.request_transfer()?;
///     STRIPS.wait_idle().await
/// }
/// ```
pub struct SharedEngine<P: WaveformPort, const CHANNELS: usize, const LEDS: usize> {
    engine: Mutex<CriticalSectionRawMutex, RefCell<Option<Engine<P, CHANNELS, LEDS>>>>,
    idle: AtomicBool,
    idle_signal: Signal<CriticalSectionRawMutex, ()>,
}

impl<P: WaveformPort, const CHANNELS: usize, const LEDS: usize> Default
    for SharedEngine<P, CHANNELS, LEDS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P: WaveformPort, const CHANNELS: usize, const LEDS: usize> SharedEngine<P, CHANNELS, LEDS> {
    /// An empty slot; [`install`](Self::install) an engine before use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            engine: Mutex::new(RefCell::new(None)),
            idle: AtomicBool::new(false),
            idle_signal: Signal::new(),
        }
    }

    /// Install `engine`, returning the one it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransferActive`] while the installed engine is streaming, since
    /// its ring must stay put until the session ends. `engine` is dropped in that case.
    pub fn install(
        &self,
        engine: Engine<P, CHANNELS, LEDS>,
    ) -> Result<Option<Engine<P, CHANNELS, LEDS>>> {
        self.engine.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.as_ref().is_some_and(Engine::is_active) {
                return Err(Error::TransferActive);
            }
            let idle = engine.is_idle();
            let previous = slot.replace(engine);
            self.publish(idle);
            Ok(previous)
        })
    }

    /// Run `f` on the engine inside a critical section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before [`install`](Self::install).
    pub fn with<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Engine<P, CHANNELS, LEDS>) -> R,
    {
        self.engine.lock(|cell| {
            let mut slot = cell.borrow_mut();
            let engine = slot.as_mut().ok_or(Error::EngineNotInitialized)?;
            let result = f(engine);
            self.publish(engine.is_idle());
            Ok(result)
        })
    }

    /// See [`Engine::write_channel_frame`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before installation, otherwise the errors
    /// of [`Engine::write_channel_frame`].
    pub fn write_channel_frame(&self, channel: u8, bytes: &[u8]) -> Result<()> {
        self.with(|engine| engine.write_channel_frame(channel, bytes))?
    }

    /// See [`Engine::write_channel_pixels`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before installation, otherwise the errors
    /// of [`Engine::write_channel_pixels`].
    pub fn write_channel_pixels<I>(&self, channel: u8, pixels: I) -> Result<()>
    where
        I: IntoIterator<Item = RGB8>,
    {
        self.with(|engine| engine.write_channel_pixels(channel, pixels))?
    }

    /// See [`Engine::unbind_channel`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before installation, otherwise the errors
    /// of [`Engine::unbind_channel`].
    pub fn unbind_channel(&self, channel: u8) -> Result<()> {
        self.with(|engine| engine.unbind_channel(channel))?
    }

    /// Request a transfer and start it at once if the engine is not busy.
    ///
    /// Returns `Ok(false)` if a session is already active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before installation.
    pub fn request_transfer(&self) -> Result<bool> {
        self.with(|engine| {
            let accepted = engine.request_transfer();
            engine.poll();
            accepted
        })
    }

    /// Lock-free idle check, safe from any context.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }

    /// Surface a latched DMA fault.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineNotInitialized`] before installation, or the latched
    /// [`Error::DmaTransfer`].
    pub fn take_fault(&self) -> Result<()> {
        self.with(Engine::take_fault)?
    }

    /// Wait until the engine is idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DmaTransfer`] if the session was aborted by a DMA fault (the
    /// fault is consumed and the engine is idle again), or
    /// [`Error::EngineNotInitialized`] before installation.
    pub async fn wait_idle(&self) -> Result<()> {
        loop {
            self.take_fault()?;
            if self.is_idle() {
                return Ok(());
            }
            self.idle_signal.wait().await;
        }
    }

    /// Forward the DMA half-transfer interrupt.
    pub fn on_half_transfer(&self) {
        self.on_event(Engine::on_half_transfer);
    }

    /// Forward the DMA transfer-complete interrupt.
    pub fn on_transfer_complete(&self) {
        self.on_event(Engine::on_transfer_complete);
    }

    /// Forward the timer update interrupt.
    pub fn on_reset_elapsed(&self) {
        self.on_event(Engine::on_reset_elapsed);
    }

    /// Forward the DMA transfer-error interrupt. Wakes [`wait_idle`](Self::wait_idle) so it
    /// can report the fault.
    pub fn on_transfer_error(&self) {
        if self.with(Engine::on_transfer_error).is_ok() {
            self.idle_signal.signal(());
        }
    }

    fn on_event(&self, event: fn(&mut Engine<P, CHANNELS, LEDS>)) {
        if self.with(event).is_err() {
            warning!("ws2812: interrupt before engine install");
        }
    }

    fn publish(&self, idle: bool) {
        let was_idle = self.idle.swap(idle, Ordering::AcqRel);
        if idle && !was_idle {
            self.idle_signal.signal(());
        }
    }
}
