//! Register access over the mouse command channel.
//!
//! The pad listens to the arguments of "set sample rate" commands. Register
//! addresses and values travel as those arguments, preceded by a selector byte
//! telling the pad how the following byte was encoded. Bytes that would be
//! mistaken for real sample rates or for bus commands are encoded first.
use thiserror::Error;

use crate::ps2::{self, BusError, Transport};

/// Sample rates a real host may send, so the pad can't treat them as data
pub const RESERVED_SAMPLE_RATES: [u8; 7] = [10, 20, 40, 60, 80, 100, 200];
/// Bytes the pad would interpret as bus commands
pub const RESERVED_COMMANDS: [u8; 4] = [0xe9, 0xee, 0xf2, 0xff];

/// Sample rate argument and trailing byte that arm the pad for a register read
const READ_SETUP: (u8, u8) = (0x66, 0x88);

/// Which encoding was applied to a byte before it was put on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    Plain,
    /// High and low nibbles swapped
    Swap,
    /// Bitwise complement
    Invert,
}

impl Transform {
    /// Choose the encoding for the given logical byte
    pub fn for_byte(byte: u8) -> Self {
        if RESERVED_COMMANDS.contains(&byte) {
            Transform::Invert
        } else if RESERVED_SAMPLE_RATES.contains(&byte) {
            Transform::Swap
        } else {
            Transform::Plain
        }
    }

    /// Apply the encoding. Both encodings are their own inverse.
    pub fn apply(&self, byte: u8) -> u8 {
        match self {
            Transform::Plain => byte,
            Transform::Swap => byte.rotate_left(4),
            Transform::Invert => !byte,
        }
    }
}

/// The three selector bytes for one kind of transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selectors {
    pub plain: u8,
    pub swap: u8,
    pub invert: u8,
}

impl Selectors {
    pub const fn get(&self, transform: Transform) -> u8 {
        match transform {
            Transform::Plain => self.plain,
            Transform::Swap => self.swap,
            Transform::Invert => self.invert,
        }
    }

    /// Returns the transform a selector stands for, if it belongs to this set
    pub fn transform(&self, selector: u8) -> Option<Transform> {
        if selector == self.plain {
            Some(Transform::Plain)
        } else if selector == self.swap {
            Some(Transform::Swap)
        } else if selector == self.invert {
            Some(Transform::Invert)
        } else {
            None
        }
    }
}

/// Selectors announcing the address of a register read
pub const READ_ADDRESS: Selectors = Selectors {
    plain: 0x66,
    swap: 0xcc,
    invert: 0x68,
};

/// Selectors announcing the address of a register write
pub const WRITE_ADDRESS: Selectors = Selectors {
    plain: 0x55,
    swap: 0x77,
    invert: 0x74,
};

/// Selectors announcing the value of a register write
pub const WRITE_VALUE: Selectors = Selectors {
    plain: 0x33,
    swap: 0x44,
    invert: 0x47,
};

/// A byte ready to go on the wire along with the selector that announces it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mangled {
    pub selector: u8,
    pub value: u8,
}

/// Encode a logical byte for transmission using the given selector set
pub fn mangle(byte: u8, selectors: &Selectors) -> Mangled {
    let transform = Transform::for_byte(byte);
    Mangled {
        selector: selectors.get(transform),
        value: transform.apply(byte),
    }
}

/// Recover the logical byte the way the pad does on receipt. Returns [None]
/// if the selector is not part of the given set.
pub fn unmangle(mangled: Mangled, selectors: &Selectors) -> Option<u8> {
    let transform = selectors.transform(mangled.selector)?;
    Some(transform.apply(mangled.value))
}

/// Represents all possible errors reading or writing a register
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("failed to read register {register:#04x}: {source}")]
    Read { register: u8, source: BusError },
    #[error("failed to write {value:#04x} to register {register:#04x}: {source}")]
    Write {
        register: u8,
        value: u8,
        source: BusError,
    },
    #[error("{0}")]
    Bus(#[from] BusError),
}

/// Send a byte as a sample rate argument
fn send_argument<T: Transport + ?Sized>(bus: &mut T, argument: u8) -> Result<(), BusError> {
    ps2::command(bus, ps2::SET_SAMPLE_RATE)?;
    ps2::command(bus, argument)
}

/// Read a register. The caller must hold the command channel for the whole
/// call, which the `&mut` borrow enforces.
pub fn read_register<T: Transport + ?Sized>(bus: &mut T, register: u8) -> Result<u8, RegisterError> {
    let wrap = |source| RegisterError::Read { register, source };
    let address = mangle(register, &READ_ADDRESS);

    send_argument(bus, READ_SETUP.0).map_err(wrap)?;
    ps2::command(bus, READ_SETUP.1).map_err(wrap)?;
    send_argument(bus, address.selector).map_err(wrap)?;
    ps2::command(bus, address.value).map_err(wrap)?;

    // The status request answers with the register value in its last byte
    let reply = ps2::command_with_reply(bus, ps2::GET_MOUSE_INFORMATION, 3).map_err(wrap)?;
    let value = reply[2];
    log::trace!("Read register {register:#04x} => {value:#04x}");

    Ok(value)
}

/// Write a register. Address and value are encoded independently.
pub fn write_register<T: Transport + ?Sized>(
    bus: &mut T,
    register: u8,
    value: u8,
) -> Result<(), RegisterError> {
    let wrap = |source| RegisterError::Write {
        register,
        value,
        source,
    };
    let address = mangle(register, &WRITE_ADDRESS);
    let data = mangle(value, &WRITE_VALUE);

    send_argument(bus, address.selector).map_err(wrap)?;
    ps2::command(bus, address.value).map_err(wrap)?;
    send_argument(bus, data.selector).map_err(wrap)?;
    ps2::command(bus, data.value).map_err(wrap)?;
    log::trace!("Wrote register {register:#04x} <= {value:#04x}");

    Ok(())
}

/// Read-modify-write a register without releasing the command channel in
/// between. Returns the value that was written.
pub fn update_register<T: Transport + ?Sized>(
    bus: &mut T,
    register: u8,
    update: impl FnOnce(u8) -> u8,
) -> Result<u8, RegisterError> {
    let value = update(read_register(bus, register)?);
    write_register(bus, register, value)?;
    Ok(value)
}
