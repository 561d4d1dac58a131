use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc::{error::SendError, Sender};

use crate::drivers::fsp::{event::KeyPress, queue::PacketQueue};

use super::command::InputCommand;

/// Possible errors for a touchpad service client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to send command to service")]
    SendError(SendError<InputCommand>),
    #[error("service no longer exists")]
    ChannelClosed,
}

impl From<SendError<InputCommand>> for ClientError {
    fn from(err: SendError<InputCommand>) -> Self {
        Self::SendError(err)
    }
}

/// A client for communicating with a running touchpad service
#[derive(Debug, Clone)]
pub struct InputClient {
    tx: Sender<InputCommand>,
    packets: PacketQueue,
}

impl InputClient {
    pub fn new(tx: Sender<InputCommand>, packets: PacketQueue) -> Self {
        Self { tx, packets }
    }

    /// Hand over a byte from the interrupt handler. Never blocks or waits.
    /// Bytes are assembled into packets right away; if the service falls
    /// behind, the oldest whole packet is dropped.
    pub fn interrupt(&self, byte: u8) -> Result<(), ClientError> {
        if self.tx.is_closed() {
            return Err(ClientError::ChannelClosed);
        }
        self.packets.push_byte(byte);
        Ok(())
    }

    /// Send a byte from the pad, waiting for room in the channel
    pub async fn send_byte(&self, byte: u8) -> Result<(), ClientError> {
        self.tx.send(InputCommand::Byte(byte)).await?;
        Ok(())
    }

    /// Notify the service about a key press or release
    pub async fn key(&self, key_code: u8, going_down: bool) -> Result<(), ClientError> {
        let key = KeyPress {
            key_code,
            going_down,
            timestamp: Instant::now(),
        };
        self.tx.send(InputCommand::Key(key)).await?;
        Ok(())
    }

    pub async fn enable(&self, enable: bool) -> Result<(), ClientError> {
        self.tx.send(InputCommand::Enable(enable)).await?;
        Ok(())
    }

    pub async fn set_clicking(&self, enabled: bool) -> Result<(), ClientError> {
        self.tx.send(InputCommand::SetClicking(enabled)).await?;
        Ok(())
    }

    /// Stop the service
    pub async fn stop(&self) -> Result<(), ClientError> {
        self.tx.send(InputCommand::Stop).await?;
        Ok(())
    }
}
