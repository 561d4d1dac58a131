use std::time::Duration;

pub mod control;
pub mod driver;
pub mod event;
pub mod filter;
pub mod gesture;
pub mod packet;
pub mod queue;
pub mod register;
pub mod ring_buffer;
pub mod scroll;
pub mod simulated;

#[cfg(test)]
pub mod driver_test;
#[cfg(test)]
pub mod gesture_test;

/// Value of [REG_DEVICE_ID] on every Finger-Sensing-Pad
pub const DEVICE_MAGIC: u8 = 0x01;

// Packet sizes
pub const PACKET_SIZE_STANDARD: usize = 3;
pub const PACKET_SIZE_LARGE: usize = 4;
pub const PACKET_SIZE_MAX: usize = 4;

/// Number of packets the ring buffer can hold between drains
pub const RING_PACKETS: usize = 32;

// Information registers
pub const REG_DEVICE_ID: u8 = 0x00;
pub const REG_VERSION: u8 = 0x01;
pub const REG_REVISION: u8 = 0x04;
pub const REG_TMOD_STATUS1: u8 = 0x0b;
pub const REG_PAGE_CTRL: u8 = 0x0f;

// Control registers
pub const REG_SYSCTL1: u8 = 0x10;
pub const REG_OPC_QDOWN: u8 = 0x31;
pub const REG_SYSCTL5: u8 = 0x40;
pub const REG_ONPAD_CTL: u8 = 0x43;
pub const REG_SWREG1: u8 = 0x90;

// REG_SYSCTL1 bits
pub const BIT_EN_REG_CLK: u8 = 0x20;

// REG_OPC_QDOWN bits
pub const BIT_EN_OPC_TAG: u8 = 0x80;

// REG_SYSCTL5 bits
pub const BIT_90_DEGREE: u8 = 0x01;
pub const BIT_EN_MSID6: u8 = 0x02;
pub const BIT_EN_MSID7: u8 = 0x04;
pub const BIT_EN_MSID8: u8 = 0x08;
pub const BIT_EN_AUTO_MSID8: u8 = 0x20;
pub const BIT_EN_PKT_G0: u8 = 0x40;

// REG_ONPAD_CTL bits
pub const BIT_ONPAD_ENABLE: u8 = 0x01;
pub const BIT_ONPAD_FBBB: u8 = 0x02;
pub const BIT_FIX_VSCR: u8 = 0x03;
pub const BIT_FIX_HSCR: u8 = 0x20;
pub const BIT_DRAG_LOCK: u8 = 0x40;

// REG_SWREG1 bits, Cx hardware and newer
pub const SWREG1_ABSOLUTE_MODE: u8 = 0x01;
pub const SWREG1_GESTURE_OUTPUT: u8 = 0x02;
pub const SWREG1_2FINGERS_OUTPUT: u8 = 0x04;
pub const SWREG1_FINGER_UP_OUTPUT: u8 = 0x08;
pub const SWREG1_CONTINUOUS_MODE: u8 = 0x10;
pub const SWREG1_GUEST_GROUP_BIT1: u8 = 0x20;
pub const SWREG1_GUEST_GROUP_BIT2: u8 = 0x40;
pub const SWREG1_COMPATIBLE_MODE: u8 = 0x80;

/// Mode written to [REG_SWREG1] when absolute reporting is enabled
pub const SWREG1_ABSOLUTE_GESTURES: u8 = SWREG1_ABSOLUTE_MODE
    | SWREG1_GESTURE_OUTPUT
    | SWREG1_2FINGERS_OUTPUT
    | SWREG1_FINGER_UP_OUTPUT
    | SWREG1_CONTINUOUS_MODE
    | SWREG1_GUEST_GROUP_BIT1
    | SWREG1_GUEST_GROUP_BIT2;

// Notify packet message types
pub const NOTIFY_MSG_GESTURE: u8 = 0xba;
pub const NOTIFY_MSG_ONE_FINGER_HOLD: u8 = 0xc0;

/// Device ID reported once the intellimouse knock switches to 4-byte packets
pub const INTELLIMOUSE_ID: u8 = 0x04;

// Default timing windows
pub const TYPING_SUPPRESSION: Duration = Duration::from_millis(500);
pub const GESTURE_LOCKOUT: Duration = Duration::from_millis(500);
pub const MOMENTUM_INTERVAL: Duration = Duration::from_millis(20);
