use std::error::Error;

use tokio::{sync::mpsc, time::Instant};

use crate::{
    drivers::fsp::{
        driver::{Driver, InterruptResult, PacketCounters},
        event::Event,
        queue::PacketQueue,
    },
    ps2::Transport,
    sync::{ReceiveTimeoutError, TimeoutReceiver},
};

use super::{client::InputClient, command::InputCommand};

/// Size of the command channel buffer
const BUFFER_SIZE: usize = 2048;

/// What woke up the service loop
enum Wake {
    Command(Result<InputCommand, ReceiveTimeoutError>),
    Packets,
}

/// Runs a [Driver] as a single task. Interrupt bytes go straight into the
/// driver's [PacketQueue] and wake the task; key presses and configuration
/// changes arrive over a channel. Decoded events are sent out over another
/// channel. The momentum timer is the deadline of the command receive.
#[derive(Debug)]
pub struct TouchpadService<T: Transport> {
    driver: Driver<T>,
    tx: mpsc::Sender<InputCommand>,
    rx: mpsc::Receiver<InputCommand>,
    packets: PacketQueue,
    events: mpsc::Sender<Event>,
    momentum_deadline: Option<Instant>,
}

impl<T: Transport> TouchpadService<T> {
    pub fn new(driver: Driver<T>, events: mpsc::Sender<Event>) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        let packets = driver.queue();
        Self {
            driver,
            tx,
            rx,
            packets,
            events,
            momentum_deadline: None,
        }
    }

    /// Returns a client that can be used to talk to the service
    pub fn client(&self) -> InputClient {
        InputClient::new(self.tx.clone(), self.packets.clone())
    }

    /// Run the service until it is stopped. Returns the packet counters
    /// collected while running.
    pub async fn run(mut self) -> Result<PacketCounters, Box<dyn Error + Send + Sync>> {
        log::debug!("Starting touchpad service");
        loop {
            let wake = tokio::select! {
                result = self.rx.recv_until(self.momentum_deadline) => Wake::Command(result),
                _ = self.packets.ready() => Wake::Packets,
            };

            let command = match wake {
                Wake::Packets => {
                    self.drain().await?;
                    continue;
                }
                Wake::Command(Ok(command)) => command,
                Wake::Command(Err(ReceiveTimeoutError::Timeout)) => {
                    self.momentum_tick().await?;
                    continue;
                }
                Wake::Command(Err(ReceiveTimeoutError::Closed)) => {
                    log::debug!("Receive channel disconnected");
                    break;
                }
            };

            match command {
                InputCommand::Byte(byte) => {
                    if self.driver.interrupt_occurred(byte) == InterruptResult::PacketReady {
                        self.drain().await?;
                    }
                }
                InputCommand::Key(key) => self.driver.handle_key(&key),
                InputCommand::Enable(enable) => {
                    self.driver.enable(enable)?;
                    if !enable {
                        self.momentum_deadline = None;
                    }
                }
                InputCommand::SetClicking(enabled) => self.driver.set_clicking(enabled),
                InputCommand::Stop => {
                    log::debug!("Received stop command");
                    break;
                }
            }
        }

        // Packets completed before the stop still count
        if let Err(e) = self.drain().await {
            log::debug!("Unable to send remaining events: {e}");
        }
        self.driver.cancel_momentum();
        log::debug!("Touchpad service stopped");

        Ok(self.driver.counters())
    }

    /// Decode buffered packets and send out the events
    async fn drain(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let events = self.driver.packet_ready(std::time::Instant::now());
        for event in events {
            self.events.send(event).await?;
        }
        if self.driver.take_momentum_request() {
            let interval = self.driver.config().momentum_interval();
            self.momentum_deadline = Some(Instant::now() + interval);
        }
        Ok(())
    }

    /// Emit the next momentum event, re-arming the timer until it runs out
    async fn momentum_tick(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let Some(event) = self.driver.momentum_tick(std::time::Instant::now()) else {
            log::trace!("Momentum finished");
            self.momentum_deadline = None;
            return Ok(());
        };
        self.events.send(event).await?;
        let interval = self.driver.config().momentum_interval();
        self.momentum_deadline = Some(Instant::now() + interval);
        Ok(())
    }
}
