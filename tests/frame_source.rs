#![allow(missing_docs)]
use ws2812_parallel::frame_source::{FrameSource, FrameSources};
use ws2812_parallel::{Error, RGB8};

#[test]
fn rejects_length_not_multiple_of_three() {
    let mut sources = FrameSources::<2, 8>::new();
    assert_eq!(
        sources.bind_channel(0, &[0; 10]),
        Err(Error::FrameLengthNotMultipleOfThree { len: 10 })
    );
    assert!(!sources.source(0).unwrap().is_bound());
}

#[test]
fn rejects_empty_and_oversized_frames() {
    let mut sources = FrameSources::<2, 2>::new();
    assert_eq!(sources.bind_channel(1, &[]), Err(Error::FrameEmpty));
    assert_eq!(
        sources.bind_channel(1, &[0; 9]),
        Err(Error::FrameTooLong { pixels: 3, leds: 2 })
    );
    assert_eq!(
        sources.bind_pixels(1, [RGB8::default(); 5]),
        Err(Error::FrameTooLong { pixels: 5, leds: 2 })
    );
    assert_eq!(
        sources.bind_pixels(1, core::iter::empty()),
        Err(Error::FrameEmpty)
    );
}

#[test]
fn rejects_out_of_range_channel() {
    let mut sources = FrameSources::<3, 4>::new();
    let expected = Err(Error::ChannelOutOfRange {
        channel: 3,
        channel_count: 3,
    });
    assert_eq!(sources.bind_channel(3, &[1, 2, 3]), expected);
    assert_eq!(sources.unbind_channel(3), expected);
    assert_eq!(sources.next_triple(3).map(|_| ()), expected);
    assert!(sources.source(3).is_err());
}

#[test]
fn failed_bind_keeps_previous_frame() {
    let mut sources = FrameSources::<1, 4>::new();
    sources.bind_channel(0, &[1, 2, 3]).unwrap();
    assert!(sources.bind_channel(0, &[1, 2]).is_err());
    assert_eq!(sources.source(0).unwrap().pixels(), &[RGB8::new(1, 2, 3)]);
}

#[test]
fn short_frame_wraps() {
    let mut source = FrameSource::<60>::from_bytes(&[1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(source.len(), 2);
    assert_eq!(source.cursor(), 0);
    assert_eq!(source.next_triple(), (1, 2, 3));
    assert_eq!(source.cursor(), 3);
    assert_eq!(source.next_triple(), (4, 5, 6));
    assert_eq!(source.cursor(), 0);
    assert_eq!(source.next_triple(), (1, 2, 3));
}

#[test]
fn cursor_stays_on_pixel_boundaries() {
    let mut source = FrameSource::<20>::from_pixels((0..20).map(|i| RGB8::new(i, i, i))).unwrap();
    for read in 0..65u8 {
        let cursor = source.cursor();
        assert_eq!(cursor % 3, 0);
        assert!(cursor < 60);
        assert_eq!(source.next_pixel(), RGB8::new(read % 20, read % 20, read % 20));
    }
    source.rewind();
    assert_eq!(source.cursor(), 0);
}

#[test]
fn unbound_source_yields_black() {
    let mut sources = FrameSources::<2, 4>::new();
    sources.bind_channel(0, &[9, 9, 9]).unwrap();
    assert_eq!(sources.next_triple(1), Ok((0, 0, 0)));
    assert_eq!(sources.source(1).unwrap().cursor(), 0);

    sources.unbind_channel(0).unwrap();
    assert!(sources.source(0).unwrap().is_empty());
    assert_eq!(sources.next_triple(0), Ok((0, 0, 0)));
}

#[test]
fn rewind_all_resets_every_cursor() {
    let mut sources = FrameSources::<2, 4>::new();
    sources.bind_channel(0, &[1, 1, 1, 2, 2, 2, 3, 3, 3]).unwrap();
    sources.bind_channel(1, &[4, 4, 4, 5, 5, 5]).unwrap();
    sources.next_triple(0).unwrap();
    sources.next_triple(0).unwrap();
    sources.next_triple(1).unwrap();

    sources.rewind_all();

    assert_eq!(sources.source(0).unwrap().cursor(), 0);
    assert_eq!(sources.source(1).unwrap().cursor(), 0);
    assert_eq!(sources.next_triple(0), Ok((1, 1, 1)));
}
