use std::error::Error;

use crate::drivers::fsp::{
    gesture::gesture_name,
    packet::{NotifyMessage, Packet},
    PACKET_SIZE_LARGE, PACKET_SIZE_MAX, PACKET_SIZE_STANDARD,
};

use super::parse_hex_byte;

pub fn handle_decode(bytes: Vec<String>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let buf = parse_packet(&bytes)?;
    let packet = Packet::classify(&buf)?;
    println!("{packet}");
    if let Packet::Notify(notify) = packet {
        if let NotifyMessage::Gesture { id, magnitude } = notify.message() {
            println!("Gesture {id:#04x} ({}), magnitude {magnitude}", gesture_name(id));
        }
    }
    Ok(())
}

/// Parse three or four hex bytes into a zero-padded packet buffer
pub fn parse_packet(bytes: &[String]) -> Result<[u8; PACKET_SIZE_MAX], Box<dyn Error + Send + Sync>> {
    if bytes.len() != PACKET_SIZE_STANDARD && bytes.len() != PACKET_SIZE_LARGE {
        return Err(format!(
            "expected {PACKET_SIZE_STANDARD} or {PACKET_SIZE_LARGE} bytes, got {}",
            bytes.len()
        )
        .into());
    }
    let mut buf = [0; PACKET_SIZE_MAX];
    for (slot, value) in buf.iter_mut().zip(bytes) {
        *slot = parse_hex_byte(value).map_err(|e| format!("invalid byte '{value}': {e}"))?;
    }
    Ok(buf)
}
