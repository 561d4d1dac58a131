use std::time::{Duration, Instant};

use crate::{
    config::FspConfig,
    drivers::fsp::{
        event::{ButtonMask, Event, Gesture, GestureInput, KeyPress, PointerEvent, ScrollEvent},
        gesture::{lookup, GestureAction, GestureStateMachine, GESTURES},
        packet::Packet,
    },
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn notify(id: u8, magnitude: u8) -> Packet {
    Packet::classify(&[0x88, 0xba, id, magnitude]).unwrap()
}

/// Absolute packet with the on-pad click tag set, so no click is synthesized
fn absolute(x: u16, y: u16) -> Packet {
    absolute_with(0x10, x, y)
}

fn absolute_with(flags: u8, x: u16, y: u16) -> Packet {
    let byte3 = (((x & 0x03) << 2) | (y & 0x03)) as u8;
    Packet::classify(&[0x48 | flags, (x >> 2) as u8, (y >> 2) as u8, byte3]).unwrap()
}

fn pointer(event: &Event) -> &PointerEvent {
    match event {
        Event::Pointer(pointer) => pointer,
        other => panic!("expected a pointer event, got {other:?}"),
    }
}

fn scroll(event: &Event) -> &ScrollEvent {
    match event {
        Event::Scroll(scroll) => scroll,
        other => panic!("expected a scroll event, got {other:?}"),
    }
}

fn key(key_code: u8, going_down: bool, timestamp: Instant) -> KeyPress {
    KeyPress {
        key_code,
        going_down,
        timestamp,
    }
}

#[test]
fn test_gesture_table() {
    let mut ids: Vec<u8> = GESTURES.iter().map(|m| m.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), GESTURES.len(), "duplicate gesture ids");

    assert_eq!(lookup(0x11).map(|m| m.action), Some(GestureAction::RightClick));
    assert_eq!(lookup(0x00).map(|m| m.action), Some(GestureAction::Lift));
    assert_eq!(lookup(0x8f).map(|m| m.allow_repeat), Some(false));
    assert!(lookup(0x55).is_none());
}

#[test]
fn test_two_finger_scroll_pairs_packets() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    let events = gestures.handle_packet(&notify(0x86, 10), t0);
    assert!(events.is_empty());
    assert!(gestures.is_in_gesture());

    // Running delta is 14 - 10, paired with the first delta of 10
    let events = gestures.handle_packet(&notify(0x86, 14), t0 + ms(10));
    assert_eq!(events.len(), 1);
    let event = scroll(&events[0]);
    assert_eq!(event.vertical, 7 * 32);
    assert_eq!(event.horizontal, 0);
}

#[test]
fn test_scroll_left_is_negative_horizontal() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x84, 4), t0);
    let events = gestures.handle_packet(&notify(0x84, 8), t0 + ms(10));
    let event = scroll(&events[0]);
    assert_eq!(event.vertical, 0);
    assert!(event.horizontal < 0);
}

#[test]
fn test_lift_starts_momentum() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x82, 6), t0);
    gestures.handle_packet(&notify(0x82, 12), t0 + ms(10));
    assert!(!gestures.take_momentum_request());

    let events = gestures.handle_packet(&notify(0x00, 0), t0 + ms(20));
    assert!(events.is_empty());
    assert!(!gestures.is_in_gesture());
    assert!(gestures.take_momentum_request());
    assert!(!gestures.take_momentum_request());

    // Max raw sample was 6, scrolling down
    let mut deltas = Vec::new();
    let mut now = t0 + ms(40);
    while let Some(event) = gestures.momentum_tick(now) {
        let event = scroll(&event);
        assert_eq!(event.horizontal, 0);
        deltas.push(event.vertical);
        now += ms(20);
    }
    assert_eq!(deltas.first(), Some(&-(6 * 32)));
    assert!(deltas.windows(2).all(|pair| pair[1] > pair[0]));
    assert_eq!(gestures.momentum_tick(now), None);
}

#[test]
fn test_cancel_momentum() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x86, 6), t0);
    gestures.handle_packet(&notify(0x86, 12), t0 + ms(10));
    gestures.handle_packet(&notify(0x00, 0), t0 + ms(20));
    assert!(gestures.take_momentum_request());

    gestures.cancel_momentum();
    assert_eq!(gestures.momentum_tick(t0 + ms(40)), None);
}

#[test]
fn test_discrete_gesture_fires_once_per_session() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    let events = gestures.handle_packet(&notify(0x8f, 1), t0);
    assert_eq!(
        events,
        vec![Event::Gesture(GestureInput {
            gesture: Gesture::ZoomIn,
            timestamp: t0,
        })]
    );

    // Same session, nothing more
    assert!(gestures.handle_packet(&notify(0x8f, 2), t0 + ms(10)).is_empty());
    assert!(gestures.handle_packet(&notify(0x2e, 2), t0 + ms(20)).is_empty());

    gestures.handle_packet(&notify(0x00, 0), t0 + ms(30));
    let events = gestures.handle_packet(&notify(0x2e, 1), t0 + ms(40));
    assert!(matches!(
        events.as_slice(),
        [Event::Gesture(GestureInput {
            gesture: Gesture::SwipeUp,
            ..
        })]
    ));
}

#[test]
fn test_two_finger_click_pulses_right_button() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    let events = gestures.handle_packet(&notify(0x11, 0), t0);
    assert_eq!(events.len(), 2);
    let press = pointer(&events[0]);
    let release = pointer(&events[1]);
    assert_eq!(press.buttons, ButtonMask::RIGHT);
    assert_eq!(release.buttons, ButtonMask::NONE);
    assert_eq!((press.dx, press.dy), (0, 0));
    assert!(release.timestamp > press.timestamp);
}

#[test]
fn test_unknown_and_ignored_gestures() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    assert!(gestures.handle_packet(&notify(0x55, 3), t0).is_empty());
    assert!(gestures.handle_packet(&notify(0x38, 3), t0).is_empty());
    assert!(gestures.handle_packet(&notify(0x18, 3), t0).is_empty());
    assert!(!gestures.is_in_gesture());
}

#[test]
fn test_one_finger_hold_closes_session() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x8b, 1), t0);
    assert!(gestures.is_in_gesture());

    let hold = Packet::classify(&[0x88, 0xc0, 0x00, 0x00]).unwrap();
    assert!(gestures.handle_packet(&hold, t0 + ms(10)).is_empty());
    assert!(!gestures.is_in_gesture());
    assert!(!gestures.take_momentum_request());

    // The hold also starts the post-gesture lockout
    assert!(gestures.handle_packet(&absolute(100, 100), t0 + ms(20)).is_empty());
}

#[test]
fn test_unknown_notification_closes_session() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x2a, 1), t0);
    let unknown = Packet::classify(&[0x88, 0x42, 0x00, 0x00]).unwrap();
    assert!(gestures.handle_packet(&unknown, t0 + ms(10)).is_empty());
    assert!(!gestures.is_in_gesture());
}

#[test]
fn test_absolute_motion_is_filtered() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    // First contact never moves the pointer
    let events = gestures.handle_packet(&absolute(100, 200), t0);
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (0, 0));

    let events = gestures.handle_packet(&absolute(103, 206), t0 + ms(10));
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (3, 6));

    // avg(103, 109) - 103, avg(206, 212) - 206
    let events = gestures.handle_packet(&absolute(109, 212), t0 + ms(20));
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (3, 3));
}

#[test]
fn test_absolute_lift_resets_filters() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    for (i, x) in [100u16, 110, 120].into_iter().enumerate() {
        gestures.handle_packet(&absolute(x, x), t0 + ms(i as u64 * 10));
    }

    let events = gestures.handle_packet(&absolute(0, 0), t0 + ms(30));
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (0, 0));

    // Next contact starts over without a jump
    let events = gestures.handle_packet(&absolute(300, 300), t0 + ms(40));
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (0, 0));
    let events = gestures.handle_packet(&absolute(306, 306), t0 + ms(50));
    assert_eq!((pointer(&events[0]).dx, pointer(&events[0]).dy), (6, 6));
}

#[test]
fn test_absolute_buttons() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    // On-pad click tag clear and no real left button: synthesized left click
    let events = gestures.handle_packet(&absolute_with(0x00, 50, 50), t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::LEFT);

    let events = gestures.handle_packet(&absolute_with(0x10, 50, 50), t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::NONE);

    let events = gestures.handle_packet(&absolute_with(0x12, 50, 50), t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::RIGHT);

    let events = gestures.handle_packet(&absolute_with(0x11, 50, 50), t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::LEFT);
}

#[test]
fn test_absolute_suppressed_during_gesture() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x86, 5), t0);
    gestures.handle_packet(&notify(0x86, 9), t0 + ms(10));
    assert!(gestures.handle_packet(&absolute(200, 200), t0 + ms(20)).is_empty());

    // Lifting ends the session and starts momentum
    assert!(gestures.handle_packet(&absolute(0, 0), t0 + ms(30)).is_empty());
    assert!(!gestures.is_in_gesture());
    assert!(gestures.take_momentum_request());
}

#[test]
fn test_post_gesture_lockout() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x8f, 1), t0);
    gestures.handle_packet(&notify(0x00, 0), t0 + ms(10));

    assert!(gestures.handle_packet(&absolute(100, 100), t0 + ms(200)).is_empty());
    assert_eq!(gestures.handle_packet(&absolute(100, 100), t0 + ms(600)).len(), 1);
}

#[test]
fn test_key_press_cancels_lockout() {
    let config = FspConfig {
        typing_suppression_ms: 100,
        ..Default::default()
    };
    let mut gestures = GestureStateMachine::new(&config);
    let t0 = Instant::now();

    gestures.handle_packet(&notify(0x8f, 1), t0);
    gestures.handle_packet(&notify(0x00, 0), t0 + ms(10));
    gestures.handle_key(&key(0x00, true, t0 + ms(20)));

    assert_eq!(gestures.handle_packet(&absolute(100, 100), t0 + ms(200)).len(), 1);
}

#[test]
fn test_typing_suppression() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();
    let normal = Packet::classify(&[0x09, 0x05, 0x01, 0x00]).unwrap();

    gestures.handle_key(&key(0x0e, true, t0));
    assert!(gestures.handle_packet(&normal, t0 + ms(100)).is_empty());
    assert!(gestures.handle_packet(&absolute(100, 100), t0 + ms(499)).is_empty());
    assert!(gestures.handle_packet(&notify(0x8f, 1), t0 + ms(200)).is_empty());

    assert_eq!(gestures.handle_packet(&normal, t0 + ms(500)).len(), 1);
}

#[test]
fn test_modifier_keys() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();
    let normal = Packet::classify(&[0x08, 0x01, 0x01, 0x00]).unwrap();

    // Holding control does not count as typing
    gestures.handle_key(&key(0x3b, true, t0));
    assert_eq!(gestures.modifiers(), 0x040000);
    assert_eq!(gestures.handle_packet(&normal, t0 + ms(10)).len(), 1);

    // Releasing it does
    gestures.handle_key(&key(0x3b, false, t0 + ms(20)));
    assert_eq!(gestures.modifiers(), 0);
    assert!(gestures.handle_packet(&normal, t0 + ms(30)).is_empty());

    // Caps lock is an ordinary key
    gestures.handle_key(&key(0x39, true, t0 + ms(600)));
    assert!(gestures.handle_packet(&normal, t0 + ms(610)).is_empty());
}

#[test]
fn test_normal_packets() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();

    let events = gestures.handle_packet(&Packet::classify(&[0x0b, 0x02, 0x03, 0x00]).unwrap(), t0);
    let event = pointer(&events[0]);
    assert_eq!(event.buttons, ButtonMask::LEFT | ButtonMask::RIGHT);
    assert_eq!((event.dx, event.dy), (2, -3));
}

#[test]
fn test_onpad_click_respects_clicking() {
    let mut gestures = GestureStateMachine::new(&FspConfig::default());
    let t0 = Instant::now();
    let opc = Packet::classify(&[0xc9, 0x00, 0x00, 0x00]).unwrap();

    let events = gestures.handle_packet(&opc, t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::LEFT);

    gestures.set_clicking(false);
    assert!(!gestures.clicking());
    let events = gestures.handle_packet(&opc, t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::NONE);

    // Real buttons always report
    let real = Packet::classify(&[0x09, 0x00, 0x00, 0x00]).unwrap();
    let events = gestures.handle_packet(&real, t0);
    assert_eq!(pointer(&events[0]).buttons, ButtonMask::LEFT);
}
