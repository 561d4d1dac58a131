//! Command channel to an auxiliary (mouse) device on a PS/2 style two-wire bus.
//!
//! Only the blocking "send one byte, read the reply" primitive lives here. The
//! electrical and timing layer belongs to whoever implements [Transport].
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Byte returned by the device after every accepted command
pub const ACK: u8 = 0xfa;
/// Byte returned by the device when it wants the command resent
pub const RESEND: u8 = 0xfe;

// Auxiliary device commands
pub const SET_SCALING_1_TO_1: u8 = 0xe6;
pub const SET_RESOLUTION: u8 = 0xe8;
pub const GET_MOUSE_INFORMATION: u8 = 0xe9;
pub const GET_ID: u8 = 0xf2;
pub const SET_SAMPLE_RATE: u8 = 0xf3;
pub const ENABLE: u8 = 0xf4;
pub const SET_DEFAULTS_AND_DISABLE: u8 = 0xf5;

/// Represents all possible errors talking to the device over the bus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("timed out waiting for a reply to command {0:#04x}")]
    Timeout(u8),
    #[error("command {command:#04x} was not acknowledged (got {got:#04x})")]
    Nak { command: u8, got: u8 },
    #[error("short reply to command {command:#04x}: expected {expected} bytes, got {got}")]
    ShortReply {
        command: u8,
        expected: usize,
        got: usize,
    },
    #[error("command channel lock was poisoned")]
    Poisoned,
}

/// A synchronous command channel to the auxiliary device.
pub trait Transport: Send {
    /// Write a single byte to the device and block until `reply_len` bytes
    /// have been read back. The first reply byte is the device's
    /// acknowledgement of the written byte.
    fn send_command(&mut self, byte: u8, reply_len: usize) -> Result<Vec<u8>, BusError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_command(&mut self, byte: u8, reply_len: usize) -> Result<Vec<u8>, BusError> {
        (**self).send_command(byte, reply_len)
    }
}

/// Send a command that only replies with an acknowledgement
pub fn command<T: Transport + ?Sized>(bus: &mut T, byte: u8) -> Result<(), BusError> {
    command_with_reply(bus, byte, 0).map(|_| ())
}

/// Send a command, check its acknowledgement, and return the `len` data bytes
/// that follow it.
pub fn command_with_reply<T: Transport + ?Sized>(
    bus: &mut T,
    byte: u8,
    len: usize,
) -> Result<Vec<u8>, BusError> {
    let reply = bus.send_command(byte, len + 1)?;
    let Some(&ack) = reply.first() else {
        return Err(BusError::ShortReply {
            command: byte,
            expected: len + 1,
            got: 0,
        });
    };
    if ack != ACK {
        return Err(BusError::Nak {
            command: byte,
            got: ack,
        });
    }
    if reply.len() != len + 1 {
        return Err(BusError::ShortReply {
            command: byte,
            expected: len + 1,
            got: reply.len(),
        });
    }
    Ok(reply[1..].to_vec())
}

/// Command channel shared between the configuration path and anything else
/// that needs to talk to the device. Multi-step sequences must hold the lock
/// for their whole duration.
#[derive(Debug)]
pub struct SharedBus<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Transport> SharedBus<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// Take exclusive access to the command channel
    pub fn lock(&self) -> Result<MutexGuard<'_, T>, BusError> {
        self.inner.lock().map_err(|_| BusError::Poisoned)
    }

    /// Run the given command sequence with exclusive access to the channel
    pub fn with<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<BusError>,
    {
        let mut bus = self.lock()?;
        f(&mut *bus)
    }
}

#[cfg(test)]
pub mod ps2_test;
