//! Per-channel frame storage and the cursors the refill path walks.
//!
//! Each channel holds a copy of the RGB frame it was last given. Frames shorter than
//! the strip wrap: the cursor returns to the first pixel once it runs past the end, so
//! a 20-pixel pattern repeats along a 60-LED strip.

use heapless::Vec;
use smart_leds::RGB8;

use crate::{Error, Result};

/// Frame and read cursor of one channel.
///
/// An unbound source yields dark pixels and never moves its cursor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameSource<const LEDS: usize> {
    pixels: Vec<RGB8, LEDS>,
    next_pixel: usize,
}

impl<const LEDS: usize> Default for FrameSource<LEDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEDS: usize> FrameSource<LEDS> {
    /// An unbound source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixels: Vec::new(),
            next_pixel: 0,
        }
    }

    /// Copy a frame from raw bytes laid out `r, g, b, r, g, b, ...`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameLengthNotMultipleOfThree`], [`Error::FrameEmpty`] or
    /// [`Error::FrameTooLong`] if `bytes` is not 1 to `LEDS` whole pixels.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 {
            return Err(Error::FrameLengthNotMultipleOfThree { len: bytes.len() });
        }
        Self::from_pixels(
            bytes
                .chunks_exact(3)
                .map(|triple| match *triple {
                    [r, g, b] => RGB8::new(r, g, b),
                    _ => RGB8::default(),
                }),
        )
    }

    /// Copy a frame from a pixel iterator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameEmpty`] or [`Error::FrameTooLong`] if the iterator does not
    /// yield 1 to `LEDS` pixels.
    pub fn from_pixels<I>(pixels: I) -> Result<Self>
    where
        I: IntoIterator<Item = RGB8>,
    {
        let mut iter = pixels.into_iter();
        let mut frame = Vec::new();
        while let Some(pixel) = iter.next() {
            if frame.push(pixel).is_err() {
                return Err(Error::FrameTooLong {
                    pixels: LEDS + 1 + iter.count(),
                    leds: LEDS,
                });
            }
        }
        if frame.is_empty() {
            return Err(Error::FrameEmpty);
        }
        Ok(Self {
            pixels: frame,
            next_pixel: 0,
        })
    }

    /// Whether a frame is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.pixels.is_empty()
    }

    /// Pixels in the bound frame (zero when unbound).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the source is unbound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The bound frame.
    #[must_use]
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Byte offset of the next pixel to read, always a multiple of 3 below the frame length.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.next_pixel * 3
    }

    /// Move the cursor back to the first pixel.
    pub const fn rewind(&mut self) {
        self.next_pixel = 0;
    }

    /// Read the pixel under the cursor and advance, wrapping to the start past the end.
    ///
    /// An unbound source returns black.
    pub fn next_pixel(&mut self) -> RGB8 {
        let Some(pixel) = self.pixels.get(self.next_pixel).copied() else {
            return RGB8::default();
        };
        self.next_pixel += 1;
        if self.next_pixel >= self.pixels.len() {
            self.next_pixel = 0;
        }
        pixel
    }

    /// [`next_pixel`](Self::next_pixel) as an `(r, g, b)` triple.
    pub fn next_triple(&mut self) -> (u8, u8, u8) {
        let pixel = self.next_pixel();
        (pixel.r, pixel.g, pixel.b)
    }
}

/// One [`FrameSource`] per channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameSources<const CHANNELS: usize, const LEDS: usize> {
    sources: [FrameSource<LEDS>; CHANNELS],
}

impl<const CHANNELS: usize, const LEDS: usize> Default for FrameSources<CHANNELS, LEDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize, const LEDS: usize> FrameSources<CHANNELS, LEDS> {
    /// Every channel unbound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: [const { FrameSource::new() }; CHANNELS],
        }
    }

    /// Replace `channel`'s frame with a copy of `bytes` and rewind its cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] for a bad channel, otherwise the errors of
    /// [`FrameSource::from_bytes`]. On error the previous frame is kept.
    pub fn bind_channel(&mut self, channel: u8, bytes: &[u8]) -> Result<()> {
        let slot = self.slot_mut(channel)?;
        *slot = FrameSource::from_bytes(bytes)?;
        Ok(())
    }

    /// Replace `channel`'s frame with pixels from an iterator and rewind its cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] for a bad channel, otherwise the errors of
    /// [`FrameSource::from_pixels`]. On error the previous frame is kept.
    pub fn bind_pixels<I>(&mut self, channel: u8, pixels: I) -> Result<()>
    where
        I: IntoIterator<Item = RGB8>,
    {
        let slot = self.slot_mut(channel)?;
        *slot = FrameSource::from_pixels(pixels)?;
        Ok(())
    }

    /// Drop `channel`'s frame. The channel outputs dark pixels from the next session on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] for a bad channel.
    pub fn unbind_channel(&mut self, channel: u8) -> Result<()> {
        *self.slot_mut(channel)? = FrameSource::new();
        Ok(())
    }

    /// Read `channel`'s next pixel as an `(r, g, b)` triple, wrapping past the frame end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] for a bad channel.
    pub fn next_triple(&mut self, channel: u8) -> Result<(u8, u8, u8)> {
        Ok(self.slot_mut(channel)?.next_triple())
    }

    /// The source bound to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`] for a bad channel.
    pub fn source(&self, channel: u8) -> Result<&FrameSource<LEDS>> {
        self.sources
            .get(usize::from(channel))
            .ok_or_else(|| out_of_range::<CHANNELS>(channel))
    }

    /// Rewind every cursor to its frame start.
    pub fn rewind_all(&mut self) {
        for source in &mut self.sources {
            source.rewind();
        }
    }

    /// Sources in channel order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u8, &mut FrameSource<LEDS>)> {
        (0u8..).zip(self.sources.iter_mut())
    }

    fn slot_mut(&mut self, channel: u8) -> Result<&mut FrameSource<LEDS>> {
        self.sources
            .get_mut(usize::from(channel))
            .ok_or_else(|| out_of_range::<CHANNELS>(channel))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "channel counts are validated to 1..=16 before an engine exists"
)]
const fn out_of_range<const CHANNELS: usize>(channel: u8) -> Error {
    Error::ChannelOutOfRange {
        channel,
        channel_count: CHANNELS as u8,
    }
}
