//! The two-LED ring the DMA streams to the output port.
//!
//! Each slot is one 16-bit word holding one bit position of one color of one LED for
//! every channel at once: bit `n` of the word belongs to channel `n`. The DMA writes each
//! word to the reset half of the port's set/reset register at the data-latch compare, so a
//! set bit pulls that channel low early (a short "0" pulse) and a clear bit leaves the line
//! high until the force-low compare (a long "1" pulse). The encoder therefore stores
//! complemented color bits.
//!
//! ```text
//!  slot   0..8    8..16   16..24 | 24..32  32..40  40..48
//!         G7..G0  R7..R0  B7..B0 | G7..G0  R7..R0  B7..B0
//!         ---- slot pair 0 ----- | ---- slot pair 1 -----
//! ```

use smart_leds::RGB8;

/// Bits per color component.
pub const COLOR_BITS: usize = 8;

/// Slots one LED occupies (three colors of [`COLOR_BITS`] each).
pub const SLOTS_PER_LED: usize = 3 * COLOR_BITS;

/// Total slots in the ring: two LEDs.
pub const RING_SLOTS: usize = 2 * SLOTS_PER_LED;

/// Most channels one ring word can carry.
pub const MAX_CHANNELS: usize = u16::BITS as usize;

/// One of the two buffered LED positions in the ring.
///
/// The DMA raises its half-transfer event after finishing [`SlotPair::First`] and its
/// transfer-complete event after finishing [`SlotPair::Second`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotPair {
    /// Slots `0..24`.
    First,
    /// Slots `24..48`.
    Second,
}

impl SlotPair {
    /// Both pairs in DMA read order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// Ring index of the pair (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// First slot of the pair.
    #[must_use]
    pub const fn base_slot(self) -> usize {
        self.index() * SLOTS_PER_LED
    }

    /// The pair the DMA reads after this one.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Color lanes of one LED in wire order (WS2812B expects green, red, blue).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorLane {
    /// Sent first.
    Green,
    /// Sent second.
    Red,
    /// Sent last.
    Blue,
}

impl ColorLane {
    /// Lanes in the order they go out on the wire.
    pub const WIRE_ORDER: [Self; 3] = [Self::Green, Self::Red, Self::Blue];

    /// Offset of the lane's most significant bit within a slot pair.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Green => 0,
            Self::Red => COLOR_BITS,
            Self::Blue => 2 * COLOR_BITS,
        }
    }

    /// The lane's component of `pixel`.
    #[must_use]
    pub const fn component(self, pixel: RGB8) -> u8 {
        match self {
            Self::Green => pixel.g,
            Self::Red => pixel.r,
            Self::Blue => pixel.b,
        }
    }
}

/// Ring slot for `bit` (0 = MSB) of `lane` in `pair`.
#[must_use]
pub const fn slot_index(pair: SlotPair, lane: ColorLane, bit: usize) -> usize {
    pair.base_slot() + lane.offset() + bit
}

/// Single-bit access to the per-channel bit planes of a slot array.
///
/// The default methods read-modify-write the whole slot word. A platform with a faster
/// single-bit store (such as Cortex-M3/M4 bit-band aliases) can override
/// [`set_channel_bit`](Self::set_channel_bit); every encoder strategy only changes the bit
/// of the channel it is encoding.
pub trait BitPlane {
    /// The word at `slot`, or `None` past the end.
    fn slot_word(&self, slot: usize) -> Option<u16>;

    /// Mutable access to the word at `slot`, or `None` past the end.
    fn slot_word_mut(&mut self, slot: usize) -> Option<&mut u16>;

    /// Set or clear `channel`'s bit in `slot`, leaving every other channel untouched.
    ///
    /// Out-of-range slots and channels are ignored.
    #[inline(always)]
    fn set_channel_bit(&mut self, slot: usize, channel: u8, value: bool) {
        let Some(mask) = channel_mask(channel) else {
            return;
        };
        if let Some(word) = self.slot_word_mut(slot) {
            if value {
                *word |= mask;
            } else {
                *word &= !mask;
            }
        }
    }

    /// Whether `channel`'s bit in `slot` is set.
    #[inline(always)]
    fn channel_bit(&self, slot: usize, channel: u8) -> bool {
        match (channel_mask(channel), self.slot_word(slot)) {
            (Some(mask), Some(word)) => word & mask != 0,
            _ => false,
        }
    }
}

/// Bit mask of `channel` within a slot word, or `None` if the channel does not fit.
#[must_use]
pub const fn channel_mask(channel: u8) -> Option<u16> {
    1u16.checked_shl(channel as u32)
}

/// The DMA-visible ring of [`RING_SLOTS`] words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitBuffer {
    slots: [u16; RING_SLOTS],
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BitBuffer {
    /// A ring with every bit clear.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [0; RING_SLOTS],
        }
    }

    /// All slot words, in DMA order. This is the memory the data-latch DMA stream reads.
    #[must_use]
    pub const fn words(&self) -> &[u16; RING_SLOTS] {
        &self.slots
    }

    /// The [`SLOTS_PER_LED`] words of one pair.
    #[must_use]
    pub fn pair_words(&self, pair: SlotPair) -> &[u16] {
        let base = pair.base_slot();
        self.slots
            .get(base..base + SLOTS_PER_LED)
            .unwrap_or_default()
    }

    /// The byte stored for `channel` in one lane of `pair`, MSB first.
    ///
    /// This is the raw (complemented) value the encoder wrote.
    #[must_use]
    pub fn lane_byte(&self, pair: SlotPair, lane: ColorLane, channel: u8) -> u8 {
        (0..COLOR_BITS).fold(0u8, |byte, bit| {
            (byte << 1) | u8::from(self.channel_bit(slot_index(pair, lane, bit), channel))
        })
    }

    /// The gamma-corrected color held for `channel` in `pair` (the complement undone).
    #[must_use]
    pub fn decode_pixel(&self, pair: SlotPair, channel: u8) -> RGB8 {
        RGB8::new(
            !self.lane_byte(pair, ColorLane::Red, channel),
            !self.lane_byte(pair, ColorLane::Green, channel),
            !self.lane_byte(pair, ColorLane::Blue, channel),
        )
    }
}

impl BitPlane for BitBuffer {
    #[inline(always)]
    fn slot_word(&self, slot: usize) -> Option<u16> {
        self.slots.get(slot).copied()
    }

    #[inline(always)]
    fn slot_word_mut(&mut self, slot: usize) -> Option<&mut u16> {
        self.slots.get_mut(slot)
    }
}
