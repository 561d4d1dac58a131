use std::fmt::{Display, Formatter};

use packed_struct::prelude::*;

use super::{NOTIFY_MSG_GESTURE, NOTIFY_MSG_ONE_FINGER_HOLD, PACKET_SIZE_MAX};

/// Packet format, taken from the top two bits of the first byte
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PacketType {
    #[default]
    Normal = 0,
    Absolute = 1,
    Notify = 2,
    /// Relative packet produced by a press on the pad surface
    NormalOnPadClick = 3,
}

// Relative motion, identical to a standard PS/2 mouse packet
//
//  7  6  5  4  3  2  1  0
// -----------------------
//  T1 T0 YS XS 1  M  R  L
//  X7 X6 X5 X4 X3 X2 X1 X0  (X delta)
//  Y7 Y6 Y5 Y4 Y3 Y2 Y1 Y0  (Y delta)
//  Z7 Z6 Z5 Z4 Z3 Z2 Z1 Z0  (4-byte mode only)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct NormalPacket {
    // byte 0
    #[packed_field(bits = "0..=1", ty = "enum")]
    pub packet_type: PacketType,
    #[packed_field(bits = "2")]
    pub y_sign: bool,
    #[packed_field(bits = "3")]
    pub x_sign: bool,
    #[packed_field(bits = "4")]
    pub sync: bool,
    #[packed_field(bits = "5")]
    pub middle: bool,
    #[packed_field(bits = "6")]
    pub right: bool,
    #[packed_field(bits = "7")]
    pub left: bool,

    // byte 1-3
    #[packed_field(bytes = "1")]
    pub dx_lo: u8,
    #[packed_field(bytes = "2")]
    pub dy_lo: u8,
    #[packed_field(bytes = "3")]
    pub z: u8,
}

impl NormalPacket {
    /// Horizontal motion, 9-bit two's complement
    pub fn dx(&self) -> i32 {
        let dx = self.dx_lo as i32;
        if self.x_sign {
            dx - 0x100
        } else {
            dx
        }
    }

    /// Vertical motion in screen orientation (the device reports up as positive)
    pub fn dy(&self) -> i32 {
        let dy = self.dy_lo as i32;
        if self.y_sign {
            -(dy - 0x100)
        } else {
            -dy
        }
    }
}

// Absolute coordinates, sent by Cx and newer pads when swreg1 bit 0 is set
//
//  7  6  5  4  3  2  1  0
// -----------------------
//  T1 T0 CM OC 1  FI R  L
//  X9 X8 X7 X6 X5 X4 X3 X2
//  Y9 Y8 Y7 Y6 Y5 Y4 Y3 Y2
//  SR SL B5 B4 X1 X0 Y1 Y0
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct AbsolutePacket {
    // byte 0
    #[packed_field(bits = "0..=1", ty = "enum")]
    pub packet_type: PacketType,
    #[packed_field(bits = "2")]
    pub coord_mode: bool,
    #[packed_field(bits = "3")]
    pub onpad_click: bool,
    #[packed_field(bits = "4")]
    pub sync: bool,
    #[packed_field(bits = "5")]
    pub finger_index: bool,
    #[packed_field(bits = "6")]
    pub right: bool,
    #[packed_field(bits = "7")]
    pub left: bool,

    // byte 1-2
    #[packed_field(bytes = "1")]
    pub x_hi: u8,
    #[packed_field(bytes = "2")]
    pub y_hi: u8,

    // byte 3
    #[packed_field(bits = "24")]
    pub scroll_right: bool,
    #[packed_field(bits = "25")]
    pub scroll_left: bool,
    #[packed_field(bits = "26")]
    pub button5: bool,
    #[packed_field(bits = "27")]
    pub button4: bool,
    #[packed_field(bits = "28..=29")]
    pub x_lo: u8,
    #[packed_field(bits = "30..=31")]
    pub y_lo: u8,
}

impl AbsolutePacket {
    /// 10-bit X coordinate
    pub fn x(&self) -> i32 {
        ((self.x_hi as i32) << 2) | (self.x_lo as i32 & 0x03)
    }

    /// 10-bit Y coordinate
    pub fn y(&self) -> i32 {
        ((self.y_hi as i32) << 2) | (self.y_lo as i32 & 0x03)
    }

    /// The pad reports (0, 0) when the finger leaves the surface
    pub fn is_lifted(&self) -> bool {
        self.x() == 0 && self.y() == 0
    }
}

// Notification, carries gesture and session events instead of motion
//
//  7  6  5  4  3  2  1  0
// -----------------------
//  T1 T0 -  OC 1  M  R  L
//  message type
//  gesture id
//  magnitude
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct NotifyPacket {
    // byte 0
    #[packed_field(bits = "0..=1", ty = "enum")]
    pub packet_type: PacketType,
    #[packed_field(bits = "2")]
    pub _reserved: bool,
    #[packed_field(bits = "3")]
    pub onpad_click: bool,
    #[packed_field(bits = "4")]
    pub sync: bool,
    #[packed_field(bits = "5")]
    pub middle: bool,
    #[packed_field(bits = "6")]
    pub right: bool,
    #[packed_field(bits = "7")]
    pub left: bool,

    // byte 1-3
    #[packed_field(bytes = "1")]
    pub message_type: u8,
    #[packed_field(bytes = "2")]
    pub gesture_id: u8,
    #[packed_field(bytes = "3")]
    pub magnitude: u8,
}

/// Sub-type of a notify packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyMessage {
    Gesture { id: u8, magnitude: u8 },
    OneFingerHold,
    Unknown(u8),
}

impl NotifyPacket {
    pub fn message(&self) -> NotifyMessage {
        match self.message_type {
            NOTIFY_MSG_GESTURE => NotifyMessage::Gesture {
                id: self.gesture_id,
                magnitude: self.magnitude,
            },
            NOTIFY_MSG_ONE_FINGER_HOLD => NotifyMessage::OneFingerHold,
            other => NotifyMessage::Unknown(other),
        }
    }
}

/// A complete packet, decoded according to its type bits
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Packet {
    Normal(NormalPacket),
    Absolute(AbsolutePacket),
    Notify(NotifyPacket),
    NormalOnPadClick(NormalPacket),
}

impl Packet {
    /// Decode a complete packet. Three byte packets are passed zero-padded.
    pub fn classify(buf: &[u8; PACKET_SIZE_MAX]) -> Result<Self, PackingError> {
        let packet = match PacketType::from_primitive(buf[0] >> 6) {
            Some(PacketType::Normal) => Packet::Normal(NormalPacket::unpack(buf)?),
            Some(PacketType::Absolute) => Packet::Absolute(AbsolutePacket::unpack(buf)?),
            Some(PacketType::Notify) => Packet::Notify(NotifyPacket::unpack(buf)?),
            Some(PacketType::NormalOnPadClick) => {
                Packet::NormalOnPadClick(NormalPacket::unpack(buf)?)
            }
            None => return Err(PackingError::InvalidValue),
        };
        Ok(packet)
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Normal(_) => PacketType::Normal,
            Packet::Absolute(_) => PacketType::Absolute,
            Packet::Notify(_) => PacketType::Notify,
            Packet::NormalOnPadClick(_) => PacketType::NormalOnPadClick,
        }
    }
}

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Packet::Absolute(p) => write!(
                f,
                "Absolute: abs_x: {}, abs_y: {}, lb:{},rb:{},fi:{},opc:{},cm:{},b4:{},b5:{},sl:{},sr:{}",
                p.x(),
                p.y(),
                p.left as u8,
                p.right as u8,
                p.finger_index as u8,
                p.onpad_click as u8,
                p.coord_mode as u8,
                p.button4 as u8,
                p.button5 as u8,
                p.scroll_left as u8,
                p.scroll_right as u8,
            ),
            Packet::Notify(p) => {
                let name = match p.message() {
                    NotifyMessage::Gesture { id, .. } => super::gesture::gesture_name(id),
                    NotifyMessage::OneFingerHold => "one finger hold",
                    NotifyMessage::Unknown(_) => "unknown notification",
                };
                write!(
                    f,
                    "Notify: {name}: {:02x}, {:02x}, {:02x}; lb:{},rb:{},mb:{},opc:{}",
                    p.message_type,
                    p.gesture_id,
                    p.magnitude,
                    p.left as u8,
                    p.right as u8,
                    p.middle as u8,
                    p.onpad_click as u8,
                )
            }
            Packet::Normal(p) => write!(
                f,
                "Normal: dx: {}, dy: {}, lb:{},rb:{},mb:{}",
                p.dx(),
                p.dy(),
                p.left as u8,
                p.right as u8,
                p.middle as u8
            ),
            Packet::NormalOnPadClick(p) => write!(
                f,
                "Normal-OPC: dx: {}, dy: {}, lb:{},rb:{},mb:{}",
                p.dx(),
                p.dy(),
                p.left as u8,
                p.right as u8,
                p.middle as u8
            ),
        }
    }
}
