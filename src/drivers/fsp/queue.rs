//! Byte path shared between the interrupt context and the consumer.
//!
//! Bytes are assembled into whole packets on the producer side, so the only
//! thing that can be lost under load is a complete packet. The consumer is
//! woken through a [Notify] which never blocks the producer.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::ps2::ACK;

use super::{ring_buffer::RingBuffer, PACKET_SIZE_MAX, PACKET_SIZE_STANDARD, RING_PACKETS};

/// PS/2 sync bit, always set in the first byte of a packet
pub const SYNC_BIT: u8 = 0x08;

/// Result of handing one byte to [PacketQueue::push_byte]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptResult {
    /// More bytes are needed, or the byte was discarded
    Buffering,
    /// A complete packet is waiting to be decoded
    PacketReady,
}

/// Collects interrupt bytes into whole packets
#[derive(Debug, Clone)]
struct PacketAssembler {
    current: [u8; PACKET_SIZE_MAX],
    byte_count: usize,
    packet_size: usize,
}

impl PacketAssembler {
    fn new(packet_size: usize) -> Self {
        Self {
            current: [0; PACKET_SIZE_MAX],
            byte_count: 0,
            packet_size,
        }
    }

    fn reset(&mut self) {
        self.current = [0; PACKET_SIZE_MAX];
        self.byte_count = 0;
    }

    /// Add a byte, returning the packet it completes
    fn push(&mut self, byte: u8) -> Option<[u8; PACKET_SIZE_MAX]> {
        self.current[self.byte_count] = byte;
        self.byte_count += 1;
        if self.byte_count < self.packet_size {
            return None;
        }
        let packet = self.current;
        self.reset();
        Some(packet)
    }
}

#[derive(Debug)]
struct QueueState {
    assembler: PacketAssembler,
    ring: RingBuffer<[u8; PACKET_SIZE_MAX], RING_PACKETS>,
    discarded: u64,
    overruns: u64,
}

/// Single producer, single consumer queue of complete packets. Clones share
/// the same queue.
#[derive(Debug, Clone)]
pub struct PacketQueue {
    state: Arc<Mutex<QueueState>>,
    ready: Arc<Notify>,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new(PACKET_SIZE_STANDARD)
    }
}

impl PacketQueue {
    pub fn new(packet_size: usize) -> Self {
        let state = QueueState {
            assembler: PacketAssembler::new(packet_size),
            ring: RingBuffer::new(),
            discarded: 0,
            overruns: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            ready: Arc::new(Notify::new()),
        }
    }

    /// Lock the state, ignoring poisoning
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one byte from the device. Never waits on the consumer; when the
    /// ring is full the oldest unread packet is dropped.
    pub fn push_byte(&self, byte: u8) -> InterruptResult {
        let mut state = self.lock();
        if state.assembler.byte_count == 0 && (byte == ACK || byte & SYNC_BIT == 0) {
            log::trace!("Discarding out of sync byte {byte:#04x}");
            state.discarded += 1;
            return InterruptResult::Buffering;
        }

        let Some(packet) = state.assembler.push(byte) else {
            return InterruptResult::Buffering;
        };
        if state.ring.push(packet).is_some() {
            log::debug!("Packet buffer overrun, dropped oldest packet");
            state.overruns += 1;
        }
        drop(state);

        self.ready.notify_one();
        InterruptResult::PacketReady
    }

    /// Take the oldest complete packet
    pub fn pop(&self) -> Option<[u8; PACKET_SIZE_MAX]> {
        self.lock().ring.pop()
    }

    /// Number of complete packets waiting
    pub fn len(&self) -> usize {
        self.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn packet_size(&self) -> usize {
        self.lock().assembler.packet_size
    }

    /// Start over at a packet boundary with the given packet size, dropping
    /// anything buffered
    pub fn reset(&self, packet_size: usize) {
        let mut state = self.lock();
        state.assembler = PacketAssembler::new(packet_size);
        state.ring.clear();
    }

    /// Bytes dropped while looking for the start of a packet
    pub fn discarded(&self) -> u64 {
        self.lock().discarded
    }

    /// Packets lost because the ring was full
    pub fn overruns(&self) -> u64 {
        self.lock().overruns
    }

    pub fn reset_counters(&self) {
        let mut state = self.lock();
        state.discarded = 0;
        state.overruns = 0;
    }

    /// Wait until a packet has been completed since the last wake up
    pub async fn ready(&self) {
        self.ready.notified().await;
    }
}
