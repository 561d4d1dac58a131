//! Software model of the pad side of the command channel.
//!
//! It acknowledges mouse commands, decodes register transfers the way the
//! hardware does, and answers the intellimouse knock. Useful for exercising
//! the configuration path without hardware.
use crate::ps2::{self, BusError, Transport, ACK, RESEND};

use super::{
    register::{unmangle, Mangled, READ_ADDRESS, WRITE_ADDRESS, WRITE_VALUE},
    DEVICE_MAGIC, INTELLIMOUSE_ID, REG_DEVICE_ID, REG_REVISION, REG_TMOD_STATUS1, REG_VERSION,
};

/// Where the pad is in a multi-byte register transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransferState {
    Idle,
    /// Got the read setup rate, waiting for its trailing byte
    ReadSetup,
    /// Read armed, waiting for the address selector
    ReadArmed,
    /// Waiting for a raw byte announced by the given selector
    ReadAddress(u8),
    WriteAddress(u8),
    WriteValue(u8),
}

#[derive(Debug, Clone)]
pub struct SimulatedPad {
    registers: [u8; 256],
    state: TransferState,
    /// Next byte is the argument of a set sample rate command
    expect_argument: bool,
    pending_read: Option<u8>,
    write_address: Option<u8>,
    recent_rates: [u8; 3],
    device_id: u8,
    enabled: bool,
    supports_intellimouse: bool,
    /// Reply with a resend request to this byte
    nak_on: Option<u8>,
    /// Stop answering after this many more bytes
    answer_budget: Option<usize>,
    written: Vec<u8>,
}

impl Default for SimulatedPad {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPad {
    /// A Cx pad (version 0xe0) with a two button layout
    pub fn new() -> Self {
        let mut registers = [0; 256];
        registers[REG_DEVICE_ID as usize] = DEVICE_MAGIC;
        registers[REG_VERSION as usize] = 0xe0;
        registers[REG_REVISION as usize] = 0x02;
        registers[REG_TMOD_STATUS1 as usize] = 0x30;

        Self {
            registers,
            state: TransferState::Idle,
            expect_argument: false,
            pending_read: None,
            write_address: None,
            recent_rates: [0; 3],
            device_id: 0,
            enabled: false,
            supports_intellimouse: true,
            nak_on: None,
            answer_budget: None,
            written: Vec::new(),
        }
    }

    pub fn without_intellimouse(mut self) -> Self {
        self.supports_intellimouse = false;
        self
    }

    /// Reject every transmission of the given byte
    pub fn with_nak_on(mut self, byte: u8) -> Self {
        self.nak_on = Some(byte);
        self
    }

    /// Go silent after answering the given number of bytes
    pub fn with_answer_budget(mut self, bytes: usize) -> Self {
        self.answer_budget = Some(bytes);
        self
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    pub fn set_register(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Every byte the host has put on the wire
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    fn handle_rate(&mut self, rate: u8) {
        self.recent_rates = [self.recent_rates[1], self.recent_rates[2], rate];
        if self.recent_rates == [200, 200, 80] && self.supports_intellimouse {
            self.device_id = INTELLIMOUSE_ID;
        }

        self.state = match self.state {
            TransferState::ReadArmed if READ_ADDRESS.transform(rate).is_some() => {
                TransferState::ReadAddress(rate)
            }
            _ if rate == 0x66 => TransferState::ReadSetup,
            _ if WRITE_ADDRESS.transform(rate).is_some() => TransferState::WriteAddress(rate),
            _ if WRITE_VALUE.transform(rate).is_some() => TransferState::WriteValue(rate),
            _ => TransferState::Idle,
        };
    }

    /// Consume a raw data byte if a transfer is waiting for one
    fn handle_data(&mut self, byte: u8) -> bool {
        match self.state {
            TransferState::Idle | TransferState::ReadArmed => return false,
            TransferState::ReadSetup => {
                self.state = if byte == 0x88 {
                    TransferState::ReadArmed
                } else {
                    TransferState::Idle
                };
                return byte == 0x88;
            }
            TransferState::ReadAddress(selector) => {
                self.pending_read = unmangle(
                    Mangled {
                        selector,
                        value: byte,
                    },
                    &READ_ADDRESS,
                );
            }
            TransferState::WriteAddress(selector) => {
                self.write_address = unmangle(
                    Mangled {
                        selector,
                        value: byte,
                    },
                    &WRITE_ADDRESS,
                );
            }
            TransferState::WriteValue(selector) => {
                let value = unmangle(
                    Mangled {
                        selector,
                        value: byte,
                    },
                    &WRITE_VALUE,
                );
                if let (Some(address), Some(value)) = (self.write_address.take(), value) {
                    self.registers[address as usize] = value;
                }
            }
        }
        self.state = TransferState::Idle;
        true
    }

    fn handle_command(&mut self, byte: u8) -> Vec<u8> {
        match byte {
            ps2::GET_MOUSE_INFORMATION => match self.pending_read.take() {
                Some(register) => vec![ACK, 0x00, 0x00, self.registers[register as usize]],
                None => vec![ACK, 0x00, 0x02, 0x64],
            },
            ps2::GET_ID => vec![ACK, self.device_id],
            ps2::SET_SAMPLE_RATE => {
                self.expect_argument = true;
                vec![ACK]
            }
            ps2::ENABLE => {
                self.enabled = true;
                vec![ACK]
            }
            ps2::SET_DEFAULTS_AND_DISABLE => {
                self.enabled = false;
                self.device_id = 0;
                vec![ACK]
            }
            _ => vec![ACK],
        }
    }
}

impl Transport for SimulatedPad {
    fn send_command(&mut self, byte: u8, reply_len: usize) -> Result<Vec<u8>, BusError> {
        self.written.push(byte);
        if let Some(budget) = self.answer_budget.as_mut() {
            if *budget == 0 {
                return Err(BusError::Timeout(byte));
            }
            *budget -= 1;
        }
        if self.nak_on == Some(byte) {
            return Ok(vec![RESEND]);
        }

        let reply = if self.expect_argument {
            self.expect_argument = false;
            self.handle_rate(byte);
            vec![ACK]
        } else if self.handle_data(byte) {
            vec![ACK]
        } else {
            self.handle_command(byte)
        };

        Ok(reply.into_iter().take(reply_len).collect())
    }
}
