use std::{error::Error, time::Instant};

use crate::{
    config::FspConfig,
    ps2::{BusError, SharedBus, Transport},
};

use super::{
    control::{self, DeviceInfo},
    event::{Event, KeyPress},
    gesture::GestureStateMachine,
    packet::{Packet, PacketType},
    queue::PacketQueue,
    PACKET_SIZE_STANDARD,
};

pub use super::queue::InterruptResult;

/// Packet statistics, kept for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketCounters {
    pub normal: u64,
    pub absolute: u64,
    pub notify: u64,
    pub normal_opc: u64,
    /// Bytes dropped while looking for the start of a packet
    pub discarded: u64,
    /// Packets lost because the ring buffer was full
    pub overruns: u64,
    /// Packets that could not be decoded
    pub malformed: u64,
}

impl PacketCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total(&self) -> u64 {
        self.normal + self.absolute + self.notify + self.normal_opc
    }

    fn count(&mut self, packet_type: PacketType) {
        match packet_type {
            PacketType::Normal => self.normal += 1,
            PacketType::Absolute => self.absolute += 1,
            PacketType::Notify => self.notify += 1,
            PacketType::NormalOnPadClick => self.normal_opc += 1,
        }
    }
}

/// Finger-Sensing-Pad driver. Bytes arrive through [Driver::interrupt_occurred]
/// and are decoded into events by [Driver::packet_ready].
#[derive(Debug)]
pub struct Driver<T: Transport> {
    bus: SharedBus<T>,
    config: FspConfig,
    info: DeviceInfo,
    enabled: bool,
    queue: PacketQueue,
    gestures: GestureStateMachine,
    counters: PacketCounters,
}

impl<T: Transport> Driver<T> {
    /// Probe the device on the given bus. Fails if the attached device is not
    /// a Finger-Sensing-Pad.
    pub fn new(bus: SharedBus<T>, config: FspConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let Some(info) = bus.with(|bus| control::identify(bus))? else {
            return Err("Device is not a Sentelic Finger-Sensing-Pad".into());
        };
        log::info!("Found {info}");
        if config.absolute_mode && !info.is_cx() {
            log::debug!("Pad predates Cx hardware, absolute packets are unlikely");
        }

        let gestures = GestureStateMachine::new(&config);
        Ok(Self {
            bus,
            config,
            info,
            enabled: false,
            queue: PacketQueue::new(PACKET_SIZE_STANDARD),
            gestures,
            counters: PacketCounters::default(),
        })
    }

    pub fn info(&self) -> DeviceInfo {
        self.info
    }

    pub fn version(&self) -> u16 {
        self.info.version
    }

    pub fn buttons(&self) -> u8 {
        self.info.buttons
    }

    pub fn config(&self) -> &FspConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of bytes per packet currently expected
    pub fn packet_size(&self) -> usize {
        self.queue.packet_size()
    }

    pub fn counters(&self) -> PacketCounters {
        PacketCounters {
            discarded: self.queue.discarded(),
            overruns: self.queue.overruns(),
            ..self.counters
        }
    }

    pub fn reset_counters(&mut self) {
        self.counters.reset();
        self.queue.reset_counters();
    }

    /// Packet queue filled by the interrupt context
    pub fn queue(&self) -> PacketQueue {
        self.queue.clone()
    }

    /// Command channel shared with the configuration path
    pub fn bus(&self) -> &SharedBus<T> {
        &self.bus
    }

    /// Start or stop reporting. Individual configuration steps that fail are
    /// logged and skipped; only losing the command channel is an error.
    pub fn enable(&mut self, enable: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = self.config.clone();
        let packet_size = self
            .bus
            .with(|bus| Ok::<_, BusError>(control::set_enabled(bus, enable, &config)))?;

        self.queue.reset(packet_size);
        if enable {
            self.gestures.reset();
        } else {
            self.gestures.cancel_momentum();
        }
        self.enabled = enable;
        log::debug!("Touchpad enabled={enable}, packet size {packet_size}");

        Ok(())
    }

    pub fn set_clicking(&mut self, enabled: bool) {
        self.config.clicking = enabled;
        self.gestures.set_clicking(enabled);
    }

    pub fn clicking(&self) -> bool {
        self.gestures.clicking()
    }

    /// Keyboard notification, used to suppress pad input while typing
    pub fn handle_key(&mut self, key: &KeyPress) {
        self.gestures.handle_key(key);
    }

    /// Returns true once after a gesture left momentum to play out
    pub fn take_momentum_request(&mut self) -> bool {
        self.gestures.take_momentum_request()
    }

    pub fn cancel_momentum(&mut self) {
        self.gestures.cancel_momentum();
    }

    /// Momentum timer callback. [None] means the timer should stop.
    pub fn momentum_tick(&mut self, now: Instant) -> Option<Event> {
        self.gestures.momentum_tick(now)
    }

    /// Handle one byte from the device. Never blocks.
    pub fn interrupt_occurred(&mut self, byte: u8) -> InterruptResult {
        self.queue.push_byte(byte)
    }

    /// Number of complete packets waiting to be decoded
    pub fn pending_packets(&self) -> usize {
        self.queue.len()
    }

    /// Decode every buffered packet and return the resulting events
    pub fn packet_ready(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(buf) = self.queue.pop() {
            let packet = match Packet::classify(&buf) {
                Ok(packet) => packet,
                Err(e) => {
                    log::debug!("Skipping malformed packet {buf:02x?}: {e:?}");
                    self.counters.malformed += 1;
                    continue;
                }
            };
            log::trace!("{packet}");
            self.counters.count(packet.packet_type());
            events.extend(self.gestures.handle_packet(&packet, now));
        }
        events
    }
}
