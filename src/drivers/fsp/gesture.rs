//! Turns classified packets into pointer, scroll, and gesture events.
use std::time::{Duration, Instant};

use crate::config::FspConfig;

use super::{
    event::{ButtonMask, Event, Gesture, GestureInput, KeyPress, PointerEvent, ScrollEvent},
    filter::MotionFilter,
    packet::{AbsolutePacket, NormalPacket, NotifyMessage, NotifyPacket, Packet},
    scroll::{ScrollDirection, ScrollSmoother},
};

/// Number of absolute samples averaged per axis
pub const AVERAGE_WINDOW: usize = 3;

/// What a gesture id reported in a notify packet does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureAction {
    /// Two finger scroll, fed through the scroll smoother
    Scroll(ScrollDirection),
    /// Discrete gesture notification
    Notify(Gesture),
    /// Two finger click, sent as a right button press and release
    RightClick,
    /// Recognized but produces no output
    Ignore,
    /// All fingers lifted, ends the gesture session
    Lift,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureMapping {
    pub id: u8,
    pub name: &'static str,
    pub action: GestureAction,
    /// When false the action only fires on the packet that opens a session
    pub allow_repeat: bool,
}

const fn mapping(
    id: u8,
    name: &'static str,
    action: GestureAction,
    allow_repeat: bool,
) -> GestureMapping {
    GestureMapping {
        id,
        name,
        action,
        allow_repeat,
    }
}

/// Gesture ids understood by Cx pads
pub const GESTURES: &[GestureMapping] = &[
    mapping(0x86, "2 finger straight up", GestureAction::Scroll(ScrollDirection::Up), true),
    mapping(0x82, "2 finger straight down", GestureAction::Scroll(ScrollDirection::Down), true),
    mapping(0x80, "2 finger straight right", GestureAction::Scroll(ScrollDirection::Right), true),
    mapping(0x84, "2 finger straight left", GestureAction::Scroll(ScrollDirection::Left), true),
    mapping(0x8f, "2 finger zoom in", GestureAction::Notify(Gesture::ZoomIn), false),
    mapping(0x8b, "2 finger zoom out", GestureAction::Notify(Gesture::ZoomOut), false),
    mapping(0xc0, "2 finger curve, counter clockwise", GestureAction::Notify(Gesture::RotateLeft), false),
    mapping(0xc4, "2 finger curve, clockwise", GestureAction::Notify(Gesture::RotateRight), false),
    mapping(0x2e, "3 finger straight up", GestureAction::Notify(Gesture::SwipeUp), false),
    mapping(0x2a, "3 finger straight down", GestureAction::Notify(Gesture::SwipeDown), false),
    mapping(0x28, "3 finger straight right", GestureAction::Notify(Gesture::SwipeRight), false),
    mapping(0x2c, "3 finger straight left", GestureAction::Notify(Gesture::SwipeLeft), false),
    mapping(0x1a, "3 finger double click", GestureAction::Notify(Gesture::Launch), false),
    mapping(0x11, "2 finger click", GestureAction::RightClick, true),
    mapping(0x18, "3 finger quick click", GestureAction::Ignore, true),
    mapping(0x19, "3 finger quick click", GestureAction::Ignore, true),
    mapping(0x38, "palm", GestureAction::Ignore, true),
    mapping(0x00, "lift", GestureAction::Lift, true),
];

/// Look up a gesture id
pub fn lookup(id: u8) -> Option<&'static GestureMapping> {
    GESTURES.iter().find(|mapping| mapping.id == id)
}

/// Human readable name of a gesture id, for packet dumps
pub fn gesture_name(id: u8) -> &'static str {
    lookup(id).map(|m| m.name).unwrap_or("unknown gesture id")
}

// ADB key codes of modifier keys and their bits in the modifier mask
const MODIFIER_FIRST: u8 = 0x36;
const MODIFIER_MASKS: [u32; 10] = [
    0x10,     // 0x36 right alt
    0x100000, // 0x37 left alt (command)
    0,        // 0x38 left shift
    0,        // 0x39 caps lock, not a modifier
    0x080000, // 0x3a left windows (option)
    0x040000, // 0x3b left control
    0,        // 0x3c right shift
    0x08,     // 0x3d right windows
    0x04,     // 0x3e right control
    0x200000, // 0x3f fn
];

fn is_modifier(key_code: u8) -> bool {
    matches!(key_code, 0x36..=0x38 | 0x3a..=0x3f)
}

/// Elapsed time since `since`, or [None] if it never happened
fn within(now: Instant, since: Option<Instant>, window: Duration) -> bool {
    since.is_some_and(|t| now.saturating_duration_since(t) < window)
}

/// Owns the gesture session, the debounce timestamps, and the per-axis and
/// scroll filters.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    clicking: bool,
    typing_suppression: Duration,
    gesture_lockout: Duration,
    in_gesture: bool,
    last_abs_x: i32,
    last_abs_y: i32,
    last_magnitude: i32,
    x_filter: MotionFilter<AVERAGE_WINDOW>,
    y_filter: MotionFilter<AVERAGE_WINDOW>,
    smoother: ScrollSmoother,
    last_key: Option<Instant>,
    gesture_stop: Option<Instant>,
    modifiers: u32,
    momentum_requested: bool,
}

impl GestureStateMachine {
    pub fn new(config: &FspConfig) -> Self {
        Self {
            clicking: config.clicking,
            typing_suppression: config.typing_suppression(),
            gesture_lockout: config.gesture_lockout(),
            in_gesture: false,
            last_abs_x: 0,
            last_abs_y: 0,
            last_magnitude: 0,
            x_filter: MotionFilter::new(),
            y_filter: MotionFilter::new(),
            smoother: ScrollSmoother::new(),
            last_key: None,
            gesture_stop: None,
            modifiers: 0,
            momentum_requested: false,
        }
    }

    pub fn set_clicking(&mut self, enabled: bool) {
        self.clicking = enabled;
    }

    pub fn clicking(&self) -> bool {
        self.clicking
    }

    pub fn is_in_gesture(&self) -> bool {
        self.in_gesture
    }

    pub fn modifiers(&self) -> u32 {
        self.modifiers
    }

    /// Returns true once after a gesture ended with momentum left to play
    /// out. The caller should start the momentum timer.
    pub fn take_momentum_request(&mut self) -> bool {
        std::mem::take(&mut self.momentum_requested)
    }

    /// Drop any momentum still running
    pub fn cancel_momentum(&mut self) {
        self.momentum_requested = false;
        self.smoother.reset();
    }

    /// Forget all session and filter state, e.g. after the device was reset
    pub fn reset(&mut self) {
        self.in_gesture = false;
        self.last_abs_x = 0;
        self.last_abs_y = 0;
        self.last_magnitude = 0;
        self.x_filter.reset();
        self.y_filter.reset();
        self.cancel_momentum();
    }

    /// Record a key press from the keyboard driver
    pub fn handle_key(&mut self, key: &KeyPress) {
        if is_modifier(key.key_code) {
            let mask = MODIFIER_MASKS[(key.key_code - MODIFIER_FIRST) as usize];
            if key.going_down {
                self.modifiers |= mask;
                return;
            }
            self.modifiers &= !mask;
            self.last_key = Some(key.timestamp);
            return;
        }

        // Typing cancels the lockout after a gesture
        self.gesture_stop = None;
        self.last_key = Some(key.timestamp);
    }

    /// Route a decoded packet and return the events it produces
    pub fn handle_packet(&mut self, packet: &Packet, now: Instant) -> Vec<Event> {
        if within(now, self.last_key, self.typing_suppression) {
            log::trace!("Ignoring packet while typing");
            return Vec::new();
        }

        match packet {
            Packet::Notify(notify) => self.handle_notify(notify, now),
            Packet::Absolute(absolute) => self.handle_absolute(absolute, now),
            Packet::Normal(normal) => vec![self.handle_normal(normal, false, now)],
            Packet::NormalOnPadClick(normal) => vec![self.handle_normal(normal, true, now)],
        }
    }

    /// Called by the momentum timer. Returns the scroll event to emit, or
    /// [None] when the momentum has run out and the timer should stop.
    ///
    /// Momentum events use the same sign convention as live scroll events
    /// (see [ScrollDirection::axes]), so a fling keeps going the way the
    /// fingers moved on both axes.
    pub fn momentum_tick(&mut self, now: Instant) -> Option<Event> {
        let delta = self.smoother.fling_delta();
        if delta <= 0 {
            return None;
        }
        let direction = self.smoother.direction()?;
        let (vertical, horizontal) = direction.axes(delta);
        Some(Event::Scroll(ScrollEvent {
            vertical,
            horizontal,
            timestamp: now,
        }))
    }

    fn end_session(&mut self, now: Instant) {
        self.in_gesture = false;
        self.gesture_stop = Some(now);
        if self.smoother.stop() > 0 {
            self.momentum_requested = true;
        }
    }

    fn handle_notify(&mut self, packet: &NotifyPacket, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        let (id, magnitude) = match packet.message() {
            NotifyMessage::Gesture { id, magnitude } => (id, magnitude as i32),
            NotifyMessage::OneFingerHold => {
                log::debug!("One finger hold");
                self.in_gesture = false;
                self.gesture_stop = Some(now);
                return events;
            }
            NotifyMessage::Unknown(message) => {
                log::debug!("Unexpected notify packet {message:#04x}, ignored");
                self.in_gesture = false;
                self.gesture_stop = Some(now);
                return events;
            }
        };

        self.last_abs_x = 0;
        self.last_abs_y = 0;

        let delta = if self.in_gesture {
            magnitude - self.last_magnitude
        } else {
            magnitude
        };
        self.last_magnitude = magnitude;

        let Some(mapping) = lookup(id) else {
            log::trace!("Unknown gesture id {id:#04x}");
            return events;
        };
        if !mapping.allow_repeat && self.in_gesture {
            return events;
        }

        match mapping.action {
            GestureAction::Scroll(direction) => {
                self.in_gesture = true;
                self.smoother.set_direction(direction);
                let delta = self.smoother.filter(delta);
                if delta > 0 {
                    let (vertical, horizontal) = direction.axes(delta);
                    events.push(Event::Scroll(ScrollEvent {
                        vertical,
                        horizontal,
                        timestamp: now,
                    }));
                }
            }
            GestureAction::Notify(gesture) => {
                log::debug!("Gesture: {}", mapping.name);
                self.in_gesture = true;
                events.push(Event::Gesture(GestureInput {
                    gesture,
                    timestamp: now,
                }));
            }
            GestureAction::RightClick => {
                events.push(Event::Pointer(PointerEvent {
                    dx: 0,
                    dy: 0,
                    buttons: ButtonMask::RIGHT,
                    timestamp: now,
                }));
                events.push(Event::Pointer(PointerEvent {
                    dx: 0,
                    dy: 0,
                    buttons: ButtonMask::NONE,
                    timestamp: now + Duration::from_nanos(1),
                }));
            }
            GestureAction::Ignore => (),
            GestureAction::Lift => {
                log::trace!("Gesture session ended");
                self.end_session(now);
            }
        }

        events
    }

    fn handle_absolute(&mut self, packet: &AbsolutePacket, now: Instant) -> Vec<Event> {
        let (mut x, mut y) = (packet.x(), packet.y());

        // Absolute packets never move the pointer during a gesture
        if self.in_gesture {
            if packet.is_lifted() {
                self.last_abs_x = 0;
                self.last_abs_y = 0;
                self.x_filter.reset();
                self.y_filter.reset();
                self.end_session(now);
            }
            return Vec::new();
        }

        if within(now, self.gesture_stop, self.gesture_lockout) {
            return Vec::new();
        }

        let mut buttons = ButtonMask::NONE;
        if packet.left {
            buttons |= ButtonMask::LEFT;
        }
        if packet.right {
            buttons |= ButtonMask::RIGHT;
        }
        if !packet.left && !packet.onpad_click {
            buttons |= ButtonMask::LEFT;
        }

        let (dx, dy) = if packet.is_lifted() {
            self.x_filter.reset();
            self.y_filter.reset();
            (0, 0)
        } else if self.last_abs_x == 0 && self.last_abs_y == 0 {
            (0, 0)
        } else {
            x = self.x_filter.filter(x);
            y = self.y_filter.filter(y);
            (x - self.last_abs_x, y - self.last_abs_y)
        };

        self.last_abs_x = x;
        self.last_abs_y = y;

        vec![Event::Pointer(PointerEvent {
            dx,
            dy,
            buttons,
            timestamp: now,
        })]
    }

    fn handle_normal(&mut self, packet: &NormalPacket, onpad_click: bool, now: Instant) -> Event {
        let mut buttons = ButtonMask::NONE;
        if self.clicking || !onpad_click {
            buttons.set(ButtonMask::LEFT, packet.left);
            buttons.set(ButtonMask::RIGHT, packet.right);
            buttons.set(ButtonMask::MIDDLE, packet.middle);
        }

        Event::Pointer(PointerEvent {
            dx: packet.dx(),
            dy: packet.dy(),
            buttons,
            timestamp: now,
        })
    }
}
