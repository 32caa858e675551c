#![allow(missing_docs)]
use embassy_futures::block_on;
use embassy_futures::join::join;
use ws2812_parallel::Error;
use ws2812_parallel::engine::{Engine, EngineConfig, SharedEngine, TransferState};
use ws2812_parallel::waveform_host::HostPort;

type Strips = SharedEngine<HostPort, 2, 2>;

fn engine() -> Engine<HostPort, 2, 2> {
    Engine::new(HostPort::new(), EngineConfig::new(72_000_000)).unwrap()
}

fn installed() -> Strips {
    let strips = Strips::new();
    assert!(strips.install(engine()).unwrap().is_none());
    strips
}

/// Fire the interrupts of a full two-LED session.
fn play_session(strips: &Strips) {
    strips.on_half_transfer();
    strips.on_transfer_complete();
    strips.on_reset_elapsed();
}

#[test]
fn use_before_install_is_an_error() {
    let strips = Strips::new();
    assert!(!strips.is_idle());
    assert_eq!(strips.write_channel_frame(0, &[1, 2, 3]), Err(Error::EngineNotInitialized));
    assert_eq!(strips.request_transfer(), Err(Error::EngineNotInitialized));
    assert_eq!(strips.take_fault(), Err(Error::EngineNotInitialized));
    assert_eq!(block_on(strips.wait_idle()), Err(Error::EngineNotInitialized));
    // Stray interrupts are dropped.
    strips.on_half_transfer();
    strips.on_transfer_error();
}

#[test]
fn request_starts_a_session_at_once() {
    let strips = installed();
    assert!(strips.is_idle());
    strips.write_channel_frame(0, &[10, 20, 30]).unwrap();

    assert_eq!(strips.request_transfer(), Ok(true));

    assert!(!strips.is_idle());
    assert_eq!(
        strips.with(|engine| engine.session().state()),
        Ok(TransferState::Streaming)
    );
    assert_eq!(strips.request_transfer(), Ok(false));
    assert_eq!(strips.write_channel_frame(0, &[1, 2, 3]), Err(Error::TransferActive));

    play_session(&strips);

    assert!(strips.is_idle());
    assert_eq!(block_on(strips.wait_idle()), Ok(()));
}

#[test]
fn wait_idle_wakes_when_the_latch_ends() {
    let strips = installed();
    strips.request_transfer().unwrap();

    let (waited, ()) = block_on(join(strips.wait_idle(), async {
        play_session(&strips);
    }));

    assert_eq!(waited, Ok(()));
    assert!(strips.is_idle());
}

#[test]
fn wait_idle_reports_a_dma_fault_once() {
    let strips = installed();
    strips.request_transfer().unwrap();
    strips.on_half_transfer();

    let (waited, ()) = block_on(join(strips.wait_idle(), async {
        strips.on_transfer_error();
    }));

    assert_eq!(waited, Err(Error::DmaTransfer { led_index: 1 }));
    assert!(strips.is_idle());
    assert_eq!(block_on(strips.wait_idle()), Ok(()));
    assert_eq!(strips.request_transfer(), Ok(true));
}

#[test]
fn install_refuses_to_move_a_streaming_engine() {
    let strips = installed();
    strips.write_channel_frame(0, &[10, 20, 30]).unwrap();
    strips.request_transfer().unwrap();
    assert!(!strips.is_idle());

    assert_eq!(strips.install(engine()).err(), Some(Error::TransferActive));

    // The streaming engine is untouched and finishes its session.
    assert_eq!(
        strips.with(|engine| engine.session().pixels_loaded()),
        Ok(2)
    );
    play_session(&strips);
    assert!(strips.is_idle());
}

#[test]
fn install_replaces_an_idle_engine() {
    let strips = installed();
    strips.write_channel_frame(0, &[10, 20, 30]).unwrap();

    let previous = strips.install(engine()).unwrap().unwrap();

    assert!(previous.is_idle());
    assert!(previous.sources().source(0).is_ok_and(|source| source.is_bound()));
    assert!(strips.is_idle());
    assert_eq!(
        strips.with(|engine| engine.sources().source(0).is_ok_and(|source| source.is_bound())),
        Ok(false)
    );
}

static STATIC_STRIPS: SharedEngine<HostPort, 2, 2> = SharedEngine::new();

#[test]
fn lives_in_a_static() {
    STATIC_STRIPS.install(engine()).unwrap();
    STATIC_STRIPS.write_channel_frame(1, &[0, 0, 255, 255, 0, 0]).unwrap();
    STATIC_STRIPS.request_transfer().unwrap();
    play_session(&STATIC_STRIPS);
    assert!(STATIC_STRIPS.is_idle());
    assert_eq!(
        STATIC_STRIPS.with(|engine| engine.session().pixels_loaded()),
        Ok(2)
    );
}
