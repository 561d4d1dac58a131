use std::time::Instant;

/// Events that can be emitted by the Sentelic FSP driver
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Pointer(PointerEvent),
    Scroll(ScrollEvent),
    Gesture(GestureInput),
}

impl Event {
    pub fn timestamp(&self) -> Instant {
        match self {
            Event::Pointer(event) => event.timestamp,
            Event::Scroll(event) => event.timestamp,
            Event::Gesture(event) => event.timestamp,
        }
    }
}

/// Bitset of pressed pointer buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask(0x0);
    pub const LEFT: ButtonMask = ButtonMask(0x1);
    pub const RIGHT: ButtonMask = ButtonMask(0x2);
    pub const MIDDLE: ButtonMask = ButtonMask(0x4);

    pub fn contains(&self, other: ButtonMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: ButtonMask, pressed: bool) {
        if pressed {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl std::ops::BitOr for ButtonMask {
    type Output = ButtonMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ButtonMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ButtonMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Relative pointer motion along with the current button state
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub dx: i32,
    pub dy: i32,
    pub buttons: ButtonMask,
    pub timestamp: Instant,
}

/// Scroll wheel motion on both axes
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollEvent {
    pub vertical: i32,
    pub horizontal: i32,
    pub timestamp: Instant,
}

/// Discrete gestures recognized by the pad
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    ZoomIn,
    ZoomOut,
    RotateLeft,
    RotateRight,
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    Launch,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureInput {
    pub gesture: Gesture,
    pub timestamp: Instant,
}

/// Key press reported by the keyboard driver, used for palm rejection
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPress {
    /// ADB key code
    pub key_code: u8,
    pub going_down: bool,
    pub timestamp: Instant,
}
