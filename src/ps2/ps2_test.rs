use std::collections::VecDeque;

use crate::ps2::{command, command_with_reply, BusError, SharedBus, Transport, ACK, RESEND};

/// Transport that replays canned replies and records what was written
struct Scripted {
    written: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
}

impl Scripted {
    fn new(replies: Vec<Vec<u8>>) -> Self {
        Self {
            written: Vec::new(),
            replies: replies.into(),
        }
    }
}

impl Transport for Scripted {
    fn send_command(&mut self, byte: u8, _reply_len: usize) -> Result<Vec<u8>, BusError> {
        self.written.push(byte);
        self.replies.pop_front().ok_or(BusError::Timeout(byte))
    }
}

#[test]
fn test_command_checks_ack() {
    let mut bus = Scripted::new(vec![vec![ACK], vec![RESEND]]);
    assert_eq!(command(&mut bus, 0xf4), Ok(()));
    assert_eq!(
        command(&mut bus, 0xf4),
        Err(BusError::Nak {
            command: 0xf4,
            got: RESEND
        })
    );
    assert_eq!(bus.written, vec![0xf4, 0xf4]);
}

#[test]
fn test_command_with_reply_strips_ack() {
    let mut bus = Scripted::new(vec![vec![ACK, 0x00, 0x02, 0x64]]);
    let reply = command_with_reply(&mut bus, 0xe9, 3).unwrap();
    assert_eq!(reply, vec![0x00, 0x02, 0x64]);
}

#[test]
fn test_command_with_reply_short() {
    let mut bus = Scripted::new(vec![vec![ACK, 0x00], vec![]]);
    assert_eq!(
        command_with_reply(&mut bus, 0xe9, 3),
        Err(BusError::ShortReply {
            command: 0xe9,
            expected: 4,
            got: 2
        })
    );
    assert_eq!(
        command_with_reply(&mut bus, 0xf2, 1),
        Err(BusError::ShortReply {
            command: 0xf2,
            expected: 2,
            got: 0
        })
    );
}

#[test]
fn test_shared_bus_holds_lock_for_sequence() {
    let bus = SharedBus::new(Scripted::new(vec![vec![ACK], vec![ACK]]));
    let result: Result<(), BusError> = bus.with(|b| {
        command(b, 0xf3)?;
        command(b, 0x64)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(bus.lock().unwrap().written, vec![0xf3, 0x64]);
}
