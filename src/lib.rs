//! Drive up to 16 WS2812B ("NeoPixel") LED strips in parallel from one GPIO port.
//!
//! One hardware timer paces the 800 kHz bit clock and three DMA streams write the port's
//! set/reset register on every bit, so all strips receive their data simultaneously and
//! the CPU only wakes twice per LED position to refill a two-LED ring. See
//! [`engine`] for the session lifecycle and [`waveform_port`] for the hardware seam.
//!
//! # Glossary
//!
//! - **Channel:** one strip, wired to one line of the GPIO port. Channel `n` is bit `n`
//!   of every ring word.
//! - **Ring:** the [`BitBuffer`](bit_buffer::BitBuffer) of 48 words the DMA streams
//!   circularly: two LEDs of 24 bits each.
//! - **Slot pair:** one LED's 24 ring words. The DMA emits one pair while the
//!   interrupt handler refills the other.
//! - **Session:** one full transfer: every channel's LEDs, then the latch (reset) pulse.
//! - **Reset pulse:** at least 50 us of low lines, which makes the strips latch their data.
//! - **Gamma:** the perceptual correction applied to each color byte before encoding.
#![cfg_attr(not(feature = "host"), no_std)]

pub(crate) mod fmt;

pub mod bit_buffer;
pub mod encoder;
pub mod engine;
mod error;
pub mod frame_source;
pub mod gamma;
pub mod timing;
#[cfg(feature = "host")]
pub mod waveform_host;
pub mod waveform_port;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

/// RGB color type of frames.
pub use smart_leds::RGB8;
