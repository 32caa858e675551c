#![allow(missing_docs)]
use ws2812_parallel::RGB8;
use ws2812_parallel::bit_buffer::{
    BitBuffer, BitPlane, ColorLane, RING_SLOTS, SLOTS_PER_LED, SlotPair, channel_mask, slot_index,
};

#[test]
fn layout_is_two_leds_of_grb_msb_first() {
    assert_eq!(RING_SLOTS, 48);
    assert_eq!(SLOTS_PER_LED, 24);
    assert_eq!(slot_index(SlotPair::First, ColorLane::Green, 0), 0);
    assert_eq!(slot_index(SlotPair::First, ColorLane::Red, 0), 8);
    assert_eq!(slot_index(SlotPair::First, ColorLane::Blue, 7), 23);
    assert_eq!(slot_index(SlotPair::Second, ColorLane::Green, 0), 24);
    assert_eq!(slot_index(SlotPair::Second, ColorLane::Blue, 7), 47);
}

#[test]
fn slot_pairs_alternate() {
    assert_eq!(SlotPair::First.other(), SlotPair::Second);
    assert_eq!(SlotPair::Second.other(), SlotPair::First);
    assert_eq!(SlotPair::ALL.map(SlotPair::index), [0, 1]);
}

#[test]
fn set_channel_bit_touches_only_that_channel() {
    let mut ring = BitBuffer::new();
    ring.set_channel_bit(5, 3, true);
    ring.set_channel_bit(5, 15, true);
    assert_eq!(ring.words()[5], 0b1000_0000_0000_1000);

    ring.set_channel_bit(5, 3, false);
    assert_eq!(ring.words()[5], 0b1000_0000_0000_0000);
    assert!(ring.channel_bit(5, 15));
    assert!(!ring.channel_bit(5, 3));
    assert!(ring.words().iter().enumerate().all(|(slot, word)| slot == 5 || *word == 0));
}

#[test]
fn out_of_range_access_is_ignored() {
    let mut ring = BitBuffer::new();
    ring.set_channel_bit(RING_SLOTS, 0, true);
    ring.set_channel_bit(0, 16, true);
    assert_eq!(ring, BitBuffer::new());
    assert!(!ring.channel_bit(RING_SLOTS, 0));
    assert_eq!(channel_mask(15), Some(0x8000));
    assert_eq!(channel_mask(16), None);
}

#[test]
fn lane_byte_reads_msb_first() {
    let mut ring = BitBuffer::new();
    // 0b1010_0001 in the red lane of pair 1, channel 2.
    for (bit, value) in [true, false, true, false, false, false, false, true]
        .into_iter()
        .enumerate()
    {
        ring.set_channel_bit(slot_index(SlotPair::Second, ColorLane::Red, bit), 2, value);
    }
    assert_eq!(ring.lane_byte(SlotPair::Second, ColorLane::Red, 2), 0b1010_0001);
    assert_eq!(ring.lane_byte(SlotPair::Second, ColorLane::Red, 1), 0);
    assert_eq!(ring.lane_byte(SlotPair::First, ColorLane::Red, 2), 0);
}

#[test]
fn decode_pixel_undoes_the_complement() {
    let mut ring = BitBuffer::new();
    // An all-ones pair is a dark pixel.
    for slot in 0..SLOTS_PER_LED {
        ring.set_channel_bit(slot, 0, true);
    }
    assert_eq!(ring.decode_pixel(SlotPair::First, 0), RGB8::new(0, 0, 0));
    // An all-zeros pair is full white.
    assert_eq!(ring.decode_pixel(SlotPair::Second, 0), RGB8::new(255, 255, 255));
}

#[test]
fn pair_words_split_the_ring() {
    let mut ring = BitBuffer::new();
    ring.set_channel_bit(23, 0, true);
    ring.set_channel_bit(24, 1, true);
    assert_eq!(ring.pair_words(SlotPair::First).len(), SLOTS_PER_LED);
    assert_eq!(ring.pair_words(SlotPair::First)[23], 0b01);
    assert_eq!(ring.pair_words(SlotPair::Second)[0], 0b10);
}
