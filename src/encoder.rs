//! Pixel-to-ring encoding.
//!
//! Encoding one pixel for one channel writes 24 ring slots (green, red, blue, each MSB
//! first) and touches only that channel's bit in each slot. The stored bit is the
//! complement of the gamma-corrected data bit.
//!
//! Four strategies trade code size for refill speed. All of them leave byte-identical
//! ring contents, so the choice is purely a performance knob.

use smart_leds::RGB8;

use crate::bit_buffer::{BitPlane, COLOR_BITS, ColorLane, SLOTS_PER_LED, SlotPair, channel_mask};
use crate::gamma::Gamma;

/// How [`encode_pixel`] writes its 24 slots.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeStrategy {
    /// Per-bit loop that masks out the channel bit and ORs the new one in.
    Loop,
    /// Per-bit loop through [`BitPlane::set_channel_bit`], the bit-band style store.
    SingleBit,
    /// Fully unrolled masked read-modify-write, eight statements per lane.
    Unrolled,
    /// Packs the complemented GRB word once and walks it with a single slot cursor.
    #[default]
    Fast,
}

/// Default encoding strategy (`EncodeStrategy::Fast`).
pub const ENCODE_STRATEGY_DEFAULT: EncodeStrategy = EncodeStrategy::Fast;

/// Write `pixel` for `channel` into `pair` of `plane`.
///
/// Each component is gamma-corrected with `gamma`, complemented, and laid out MSB first in
/// wire order. Other channels' bits in the touched slots are preserved. Channels that do
/// not fit a slot word are ignored.
#[inline]
pub fn encode_pixel<B: BitPlane + ?Sized>(
    plane: &mut B,
    strategy: EncodeStrategy,
    gamma: Gamma,
    channel: u8,
    pair: SlotPair,
    pixel: RGB8,
) {
    let Some(mask) = channel_mask(channel) else {
        return;
    };
    let corrected = RGB8::new(gamma.apply(pixel.r), gamma.apply(pixel.g), gamma.apply(pixel.b));
    match strategy {
        EncodeStrategy::Loop => encode_loop(plane, mask, pair, corrected),
        EncodeStrategy::SingleBit => encode_single_bit(plane, channel, pair, corrected),
        EncodeStrategy::Unrolled => encode_unrolled(plane, mask, pair, corrected),
        EncodeStrategy::Fast => encode_fast(plane, channel, pair, corrected),
    }
}

/// Write a dark pixel for `channel` into `pair`. Every stored bit becomes 1.
#[inline]
pub fn encode_blank<B: BitPlane + ?Sized>(
    plane: &mut B,
    strategy: EncodeStrategy,
    channel: u8,
    pair: SlotPair,
) {
    // Gamma of zero is zero for every curve, so the curve choice does not matter here.
    encode_pixel(plane, strategy, Gamma::Linear, channel, pair, RGB8::default());
}

/// Complemented 24-bit wire word, green in the top byte.
#[must_use]
#[inline(always)]
pub const fn wire_word(corrected: RGB8) -> u32 {
    let grb = ((corrected.g as u32) << 16) | ((corrected.r as u32) << 8) | corrected.b as u32;
    !grb & 0x00FF_FFFF
}

#[inline(always)]
fn write_masked<B: BitPlane + ?Sized>(plane: &mut B, slot: usize, mask: u16, bit: bool) {
    if let Some(word) = plane.slot_word_mut(slot) {
        *word &= !mask;
        if bit {
            *word |= mask;
        }
    }
}

fn encode_loop<B: BitPlane + ?Sized>(plane: &mut B, mask: u16, pair: SlotPair, corrected: RGB8) {
    for lane in ColorLane::WIRE_ORDER {
        let stored = !lane.component(corrected);
        let base = pair.base_slot() + lane.offset();
        for bit in 0..COLOR_BITS {
            let value = (stored >> (COLOR_BITS - 1 - bit)) & 1 == 1;
            write_masked(plane, base + bit, mask, value);
        }
    }
}

fn encode_single_bit<B: BitPlane + ?Sized>(
    plane: &mut B,
    channel: u8,
    pair: SlotPair,
    corrected: RGB8,
) {
    for lane in ColorLane::WIRE_ORDER {
        let stored = !lane.component(corrected);
        let base = pair.base_slot() + lane.offset();
        for bit in 0..COLOR_BITS {
            plane.set_channel_bit(base + bit, channel, stored & (0x80 >> bit) != 0);
        }
    }
}

macro_rules! unrolled_lane {
    ($plane:expr, $mask:expr, $base:expr, $stored:expr) => {
        write_masked($plane, $base, $mask, $stored & 0x80 != 0);
        write_masked($plane, $base + 1, $mask, $stored & 0x40 != 0);
        write_masked($plane, $base + 2, $mask, $stored & 0x20 != 0);
        write_masked($plane, $base + 3, $mask, $stored & 0x10 != 0);
        write_masked($plane, $base + 4, $mask, $stored & 0x08 != 0);
        write_masked($plane, $base + 5, $mask, $stored & 0x04 != 0);
        write_masked($plane, $base + 6, $mask, $stored & 0x02 != 0);
        write_masked($plane, $base + 7, $mask, $stored & 0x01 != 0);
    };
}

fn encode_unrolled<B: BitPlane + ?Sized>(
    plane: &mut B,
    mask: u16,
    pair: SlotPair,
    corrected: RGB8,
) {
    let base = pair.base_slot();
    let green = !corrected.g;
    let red = !corrected.r;
    let blue = !corrected.b;
    unrolled_lane!(plane, mask, base + ColorLane::Green.offset(), green);
    unrolled_lane!(plane, mask, base + ColorLane::Red.offset(), red);
    unrolled_lane!(plane, mask, base + ColorLane::Blue.offset(), blue);
}

fn encode_fast<B: BitPlane + ?Sized>(plane: &mut B, channel: u8, pair: SlotPair, corrected: RGB8) {
    let word = wire_word(corrected);
    let mut slot = pair.base_slot();
    let mut bit_mask = 1u32 << (SLOTS_PER_LED - 1);
    while bit_mask != 0 {
        plane.set_channel_bit(slot, channel, word & bit_mask != 0);
        slot += 1;
        bit_mask >>= 1;
    }
}
