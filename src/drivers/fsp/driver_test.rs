use std::{
    error::Error,
    time::{Duration, Instant},
};

use crate::{
    config::FspConfig,
    drivers::fsp::{
        driver::{Driver, InterruptResult, PacketCounters},
        event::{ButtonMask, Event},
        simulated::SimulatedPad,
        PACKET_SIZE_LARGE, PACKET_SIZE_STANDARD, REG_DEVICE_ID, RING_PACKETS,
    },
    ps2::SharedBus,
};

fn new_driver() -> Result<Driver<SimulatedPad>, Box<dyn Error + Send + Sync>> {
    Driver::new(SharedBus::new(SimulatedPad::new()), FspConfig::default())
}

/// Feed bytes one at a time like the interrupt handler would
fn feed(driver: &mut Driver<SimulatedPad>, bytes: &[u8]) -> Vec<InterruptResult> {
    bytes.iter().map(|b| driver.interrupt_occurred(*b)).collect()
}

#[test]
fn test_probe() -> Result<(), Box<dyn Error + Send + Sync>> {
    let driver = new_driver()?;
    assert_eq!(driver.version(), 0xe002);
    assert_eq!(driver.buttons(), 0x02);
    assert!(!driver.is_enabled());
    assert_eq!(driver.packet_size(), PACKET_SIZE_STANDARD);

    Ok(())
}

#[test]
fn test_probe_rejects_other_devices() {
    let mut pad = SimulatedPad::new();
    pad.set_register(REG_DEVICE_ID, 0x03);
    let result = Driver::new(SharedBus::new(pad), FspConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_enable_switches_packet_size() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.enable(true)?;
    assert!(driver.is_enabled());
    assert_eq!(driver.packet_size(), PACKET_SIZE_LARGE);
    assert!(driver.bus().lock()?.is_enabled());

    driver.enable(false)?;
    assert!(!driver.is_enabled());
    assert!(!driver.bus().lock()?.is_enabled());

    Ok(())
}

#[test]
fn test_normal_packet_end_to_end() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    let results = feed(&mut driver, &[0x09, 0x05, 0xfe]);
    assert_eq!(
        results,
        vec![
            InterruptResult::Buffering,
            InterruptResult::Buffering,
            InterruptResult::PacketReady
        ]
    );

    let events = driver.packet_ready(Instant::now());
    assert_eq!(events.len(), 1);
    let Event::Pointer(event) = &events[0] else {
        panic!("expected a pointer event");
    };
    assert_eq!(event.dx, 5);
    assert_eq!(event.dy, -254);
    assert_eq!(event.buttons, ButtonMask::LEFT);
    assert_eq!(driver.counters().normal, 1);

    Ok(())
}

#[test]
fn test_scroll_gesture_end_to_end() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.enable(true)?;
    let t0 = Instant::now();

    let results = feed(&mut driver, &[0x88, 0xba, 0x86, 0x0a]);
    assert_eq!(results.last(), Some(&InterruptResult::PacketReady));
    assert!(driver.packet_ready(t0).is_empty());

    feed(&mut driver, &[0x88, 0xba, 0x86, 0x0e]);
    let events = driver.packet_ready(t0 + Duration::from_millis(10));
    assert_eq!(events.len(), 1);
    let Event::Scroll(event) = &events[0] else {
        panic!("expected a scroll event");
    };
    assert!(event.vertical > 0);
    assert_eq!(event.horizontal, 0);
    assert_eq!(driver.counters().notify, 2);

    Ok(())
}

#[test]
fn test_out_of_sync_bytes_are_dropped() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;

    // A stray ack and a byte without the sync bit can't start a packet
    let results = feed(&mut driver, &[0xfa, 0x05, 0x08, 0x01, 0xfa]);
    assert_eq!(
        results,
        vec![
            InterruptResult::Buffering,
            InterruptResult::Buffering,
            InterruptResult::Buffering,
            InterruptResult::Buffering,
            InterruptResult::PacketReady,
        ]
    );
    assert_eq!(driver.counters().discarded, 2);
    assert_eq!(driver.packet_ready(Instant::now()).len(), 1);

    Ok(())
}

#[test]
fn test_partial_packet_not_dispatched() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.enable(true)?;

    feed(&mut driver, &[0x88, 0xba, 0x86]);
    assert_eq!(driver.pending_packets(), 0);
    assert!(driver.packet_ready(Instant::now()).is_empty());
    assert_eq!(driver.counters().total(), 0);

    // Enabling again starts from a clean packet boundary
    driver.enable(true)?;
    feed(&mut driver, &[0x09, 0x01, 0x01, 0x00]);
    assert_eq!(driver.pending_packets(), 1);

    Ok(())
}

#[test]
fn test_overrun_drops_oldest_packet() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;

    // First packet has the left button down, the rest don't
    feed(&mut driver, &[0x09, 0x00, 0x00]);
    for _ in 0..RING_PACKETS {
        feed(&mut driver, &[0x08, 0x01, 0x00]);
    }
    assert_eq!(driver.pending_packets(), RING_PACKETS);
    assert_eq!(driver.counters().overruns, 1);

    let events = driver.packet_ready(Instant::now());
    assert_eq!(events.len(), RING_PACKETS);
    assert!(events.iter().all(|event| match event {
        Event::Pointer(pointer) => pointer.buttons == ButtonMask::NONE && pointer.dx == 1,
        _ => false,
    }));

    Ok(())
}

#[test]
fn test_counters() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.enable(true)?;

    feed(&mut driver, &[0x08, 0x00, 0x00, 0x00]);
    feed(&mut driver, &[0x58, 0x10, 0x10, 0x00]);
    feed(&mut driver, &[0x88, 0xba, 0x38, 0x00]);
    feed(&mut driver, &[0xc8, 0x00, 0x00, 0x00]);
    driver.packet_ready(Instant::now());

    let counters = driver.counters();
    assert_eq!(
        counters,
        PacketCounters {
            normal: 1,
            absolute: 1,
            notify: 1,
            normal_opc: 1,
            ..Default::default()
        }
    );
    assert_eq!(counters.total(), 4);

    driver.reset_counters();
    assert_eq!(driver.counters(), PacketCounters::default());

    Ok(())
}

#[test]
fn test_disable_stops_momentum() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.enable(true)?;
    let t0 = Instant::now();

    feed(&mut driver, &[0x88, 0xba, 0x86, 0x04]);
    feed(&mut driver, &[0x88, 0xba, 0x86, 0x08]);
    feed(&mut driver, &[0x88, 0xba, 0x00, 0x00]);
    driver.packet_ready(t0);
    assert!(driver.take_momentum_request());

    driver.enable(false)?;
    assert_eq!(driver.momentum_tick(t0 + Duration::from_millis(20)), None);

    Ok(())
}

#[test]
fn test_clicking_toggle() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut driver = new_driver()?;
    driver.set_clicking(false);
    assert!(!driver.clicking());
    assert!(!driver.config().clicking);

    feed(&mut driver, &[0xc9, 0x00, 0x00]);
    let events = driver.packet_ready(Instant::now());
    let Event::Pointer(event) = &events[0] else {
        panic!("expected a pointer event");
    };
    assert_eq!(event.buttons, ButtonMask::NONE);

    Ok(())
}
