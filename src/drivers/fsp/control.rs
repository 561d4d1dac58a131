//! Configuration sequences built on register access. Every function takes the
//! command channel by `&mut` so a sequence can't interleave with anything else.
use std::fmt::Display;

use crate::{
    config::FspConfig,
    ps2::{self, BusError, Transport},
};

use super::{
    register::{read_register, update_register, write_register, RegisterError},
    BIT_EN_AUTO_MSID8, BIT_EN_MSID6, BIT_EN_MSID7, BIT_EN_MSID8, BIT_EN_OPC_TAG, BIT_EN_PKT_G0,
    BIT_EN_REG_CLK, BIT_FIX_HSCR, BIT_FIX_VSCR, BIT_ONPAD_ENABLE, DEVICE_MAGIC, INTELLIMOUSE_ID,
    PACKET_SIZE_LARGE, PACKET_SIZE_STANDARD, REG_DEVICE_ID, REG_ONPAD_CTL, REG_OPC_QDOWN,
    REG_REVISION, REG_SWREG1, REG_SYSCTL1, REG_SYSCTL5, REG_TMOD_STATUS1, REG_VERSION,
    SWREG1_ABSOLUTE_GESTURES,
};

/// Button layouts, indexed by bits 4..5 of [REG_TMOD_STATUS1]
const BUTTON_LAYOUTS: [u8; 4] = [
    0x16, // Left/Middle/Right/Forward/Backward & Scroll Up/Down
    0x06, // Left/Middle/Right & Scroll Up/Down/Right/Left
    0x04, // Left/Middle/Right & Scroll Up/Down
    0x02, // Left/Middle/Right
];

/// Identity of a detected pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Version register in the high byte, revision in the low byte
    pub version: u16,
    pub buttons: u8,
}

impl DeviceInfo {
    /// Cx and newer pads support absolute packets and gestures
    pub fn is_cx(&self) -> bool {
        (self.version >> 8) >= 0xe0
    }
}

impl Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sentelic FSP {}.{}.{} buttons {:#04x}",
            (self.version >> 12) & 0x0f,
            (self.version >> 8) & 0x0f,
            self.version & 0x0f,
            self.buttons
        )
    }
}

/// Check that a Finger-Sensing-Pad is attached and read its identity.
/// Returns [None] if the device ID doesn't match.
pub fn identify<T: Transport + ?Sized>(bus: &mut T) -> Result<Option<DeviceInfo>, RegisterError> {
    let magic = read_register(bus, REG_DEVICE_ID)?;
    if magic != DEVICE_MAGIC {
        log::debug!("Device ID {magic:#04x} is not a Finger-Sensing-Pad");
        return Ok(None);
    }

    let version = (read_register(bus, REG_VERSION)? as u16) << 8;
    let version = version | read_register(bus, REG_REVISION)? as u16;
    let buttons = get_buttons(bus)?;

    Ok(Some(DeviceInfo { version, buttons }))
}

/// Button layout advertised by the pad
pub fn get_buttons<T: Transport + ?Sized>(bus: &mut T) -> Result<u8, RegisterError> {
    let value = read_register(bus, REG_TMOD_STATUS1)?;
    Ok(BUTTON_LAYOUTS[((value & 0x30) >> 4) as usize])
}

/// Enable or disable writes to protected registers
pub fn write_enable<T: Transport + ?Sized>(bus: &mut T, enable: bool) -> Result<(), RegisterError> {
    update_register(bus, REG_SYSCTL1, |value| {
        if enable {
            value | BIT_EN_REG_CLK
        } else {
            value & !BIT_EN_REG_CLK
        }
    })?;
    Ok(())
}

/// Tag on-pad clicks in packets so they can be filtered
pub fn opc_tag_enable<T: Transport + ?Sized>(bus: &mut T, enable: bool) -> Result<(), RegisterError> {
    write_enable(bus, true)?;
    let result = update_register(bus, REG_OPC_QDOWN, |value| {
        if enable {
            value | BIT_EN_OPC_TAG
        } else {
            value & !BIT_EN_OPC_TAG
        }
    });
    // Always try to lock the registers again, even if the update failed
    let locked = write_enable(bus, false);
    result?;
    locked
}

/// Enable the icon switch button and absolute packets
pub fn onpad_icon<T: Transport + ?Sized>(bus: &mut T, enable: bool) -> Result<(), RegisterError> {
    update_register(bus, REG_SYSCTL5, |value| {
        let value = value & !(BIT_EN_MSID7 | BIT_EN_MSID8 | BIT_EN_AUTO_MSID8);
        if enable {
            value | BIT_EN_MSID8 | BIT_EN_PKT_G0
        } else {
            value
        }
    })?;
    Ok(())
}

/// Vertical scrolling zone on the pad edge
pub fn onpad_vscroll<T: Transport + ?Sized>(
    bus: &mut T,
    enable: bool,
) -> Result<(), RegisterError> {
    update_register(bus, REG_ONPAD_CTL, |value| {
        if enable {
            value | BIT_FIX_VSCR | BIT_ONPAD_ENABLE
        } else {
            value & !BIT_FIX_VSCR
        }
    })?;
    Ok(())
}

/// Horizontal scrolling zone on the pad edge, which also needs the matching
/// packet output enabled
pub fn onpad_hscroll<T: Transport + ?Sized>(
    bus: &mut T,
    enable: bool,
) -> Result<(), RegisterError> {
    update_register(bus, REG_ONPAD_CTL, |value| {
        if enable {
            value | BIT_FIX_HSCR | BIT_ONPAD_ENABLE
        } else {
            value & !BIT_FIX_HSCR
        }
    })?;
    update_register(bus, REG_SYSCTL5, |value| {
        if enable {
            value | BIT_EN_MSID6
        } else {
            value & !(BIT_EN_MSID6 | BIT_EN_MSID7 | BIT_EN_MSID8)
        }
    })?;
    Ok(())
}

/// Knock sequence that switches a wheel mouse into 4-byte packets. Returns the
/// device ID reported afterwards.
pub fn intellimouse_mode<T: Transport + ?Sized>(bus: &mut T) -> Result<u8, BusError> {
    for rate in [200, 200, 80] {
        ps2::command(bus, ps2::SET_SAMPLE_RATE)?;
        ps2::command(bus, rate)?;
    }
    let reply = ps2::command_with_reply(bus, ps2::GET_ID, 1)?;
    Ok(reply[0])
}

/// Start or stop packet reporting and program the reporting mode. Steps that
/// fail are logged and skipped. Returns the packet size now in effect.
pub fn set_enabled<T: Transport + ?Sized>(bus: &mut T, enable: bool, config: &FspConfig) -> usize {
    let command = if enable {
        ps2::ENABLE
    } else {
        ps2::SET_DEFAULTS_AND_DISABLE
    };
    if let Err(e) = ps2::command(bus, command) {
        log::warn!("Failed to set touchpad enabled={enable}: {e}");
    }

    if let Err(e) = opc_tag_enable(bus, config.opc_tag) {
        log::warn!("Failed to configure on-pad click tagging: {e}");
    }
    if let Err(e) = onpad_icon(bus, false) {
        log::warn!("Failed to disable on-pad icon: {e}");
    }
    if config.absolute_mode {
        if let Err(e) = write_register(bus, REG_SWREG1, SWREG1_ABSOLUTE_GESTURES) {
            log::warn!("Failed to enable absolute mode: {e}");
        }
    }

    if !config.intellimouse {
        return PACKET_SIZE_STANDARD;
    }
    match intellimouse_mode(bus) {
        Ok(INTELLIMOUSE_ID) => {
            log::debug!("Intellimouse mode enabled, using 4-byte packets");
            PACKET_SIZE_LARGE
        }
        Ok(id) => {
            log::debug!("Intellimouse mode returned device ID {id:#04x}");
            PACKET_SIZE_STANDARD
        }
        Err(e) => {
            log::warn!("Failed to enable intellimouse mode: {e}");
            PACKET_SIZE_STANDARD
        }
    }
}
