use std::{error::Error, time::Duration};

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    config::FspConfig,
    drivers::fsp::{
        driver::{Driver, PacketCounters},
        event::Event,
        simulated::SimulatedPad,
    },
    input::service::TouchpadService,
    ps2::SharedBus,
};

use super::parse_hex_byte;

/// Error parsing a capture file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// One line of a capture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    /// Bytes received from the pad
    Bytes(Vec<u8>),
    /// Key press or release, given as an ADB key code
    Key { code: u8, down: bool },
    /// Pause before the next step
    Wait(Duration),
}

/// Parse a capture. Each line holds hex bytes, a `key <code> <down|up>`
/// or a `wait <ms>` directive. Anything after a `#` is ignored.
pub fn parse_capture(content: &str) -> Result<Vec<ReplayStep>, ParseError> {
    let mut steps = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let error = |message: String| ParseError { line, message };
        let mut words = text.split_whitespace();
        let step = match words.next() {
            Some("key") => {
                let code = words
                    .next()
                    .ok_or_else(|| error("missing key code".to_string()))?;
                let code = parse_hex_byte(code)
                    .map_err(|e| error(format!("invalid key code '{code}': {e}")))?;
                let down = match words.next() {
                    Some("down") => true,
                    Some("up") => false,
                    Some(other) => return Err(error(format!("expected down or up, got '{other}'"))),
                    None => return Err(error("missing key direction".to_string())),
                };
                ReplayStep::Key { code, down }
            }
            Some("wait") => {
                let millis = words
                    .next()
                    .ok_or_else(|| error("missing wait time".to_string()))?;
                let millis: u64 = millis
                    .parse()
                    .map_err(|e| error(format!("invalid wait time '{millis}': {e}")))?;
                ReplayStep::Wait(Duration::from_millis(millis))
            }
            _ => {
                let bytes = text
                    .split_whitespace()
                    .map(|word| {
                        parse_hex_byte(word).map_err(|e| error(format!("invalid byte '{word}': {e}")))
                    })
                    .collect::<Result<Vec<u8>, ParseError>>()?;
                steps.push(ReplayStep::Bytes(bytes));
                continue;
            }
        };
        if let Some(extra) = words.next() {
            return Err(error(format!("unexpected '{extra}'")));
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Human readable form of an emitted event
pub fn format_event(event: &Event) -> String {
    match event {
        Event::Pointer(pointer) => format!(
            "pointer dx: {}, dy: {}, buttons: {:#04x}",
            pointer.dx, pointer.dy, pointer.buttons.0
        ),
        Event::Scroll(scroll) => format!(
            "scroll vertical: {}, horizontal: {}",
            scroll.vertical, scroll.horizontal
        ),
        Event::Gesture(gesture) => format!("gesture {:?}", gesture.gesture),
    }
}

/// Run the steps through a touchpad service backed by the simulated pad.
/// Every emitted event is handed to `on_event`. Returns the packet counters.
pub async fn replay<F>(
    steps: Vec<ReplayStep>,
    config: FspConfig,
    mut on_event: F,
) -> Result<PacketCounters, Box<dyn Error + Send + Sync>>
where
    F: FnMut(Event) + Send + 'static,
{
    let driver = Driver::new(SharedBus::new(SimulatedPad::new()), config)?;
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let service = TouchpadService::new(driver, events_tx);
    let client = service.client();
    let service_task = tokio::spawn(service.run());
    let printer_task = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            on_event(event);
        }
    });

    client.enable(true).await?;
    for step in steps {
        match step {
            ReplayStep::Bytes(bytes) => {
                for byte in bytes {
                    client.send_byte(byte).await?;
                }
            }
            ReplayStep::Key { code, down } => client.key(code, down).await?,
            ReplayStep::Wait(duration) => tokio::time::sleep(duration).await,
        }
    }
    client.stop().await?;

    let counters = service_task.await??;
    printer_task.await?;

    Ok(counters)
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Packet Type")]
    kind: String,
    #[tabled(rename = "Count")]
    count: u64,
}

pub async fn handle_replay(path: String, config: FspConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(&path).await?;
    let steps = parse_capture(&content)?;
    log::debug!("Replaying {} steps from {path}", steps.len());

    let counters = replay(steps, config, |event| println!("{}", format_event(&event))).await?;

    let rows = vec![
        CounterRow { kind: "Normal".to_string(), count: counters.normal },
        CounterRow { kind: "Absolute".to_string(), count: counters.absolute },
        CounterRow { kind: "Notify".to_string(), count: counters.notify },
        CounterRow { kind: "Normal-OPC".to_string(), count: counters.normal_opc },
        CounterRow { kind: "Discarded bytes".to_string(), count: counters.discarded },
        CounterRow { kind: "Overruns".to_string(), count: counters.overruns },
        CounterRow { kind: "Malformed".to_string(), count: counters.malformed },
    ];
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Packets"));
    println!("{table}");
    println!("Decoded {} packet(s)", counters.total());

    Ok(())
}
