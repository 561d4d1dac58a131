use std::error::Error;

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::{
    config::FspConfig,
    drivers::fsp::{
        driver::Driver, register::read_register, simulated::SimulatedPad, REG_DEVICE_ID,
        REG_ONPAD_CTL, REG_OPC_QDOWN, REG_REVISION, REG_SWREG1, REG_SYSCTL1, REG_SYSCTL5,
        REG_TMOD_STATUS1, REG_VERSION,
    },
    ps2::SharedBus,
};

/// Registers shown after probing
const PROBED_REGISTERS: [(&str, u8); 9] = [
    ("DEVICE_ID", REG_DEVICE_ID),
    ("VERSION", REG_VERSION),
    ("REVISION", REG_REVISION),
    ("TMOD_STATUS1", REG_TMOD_STATUS1),
    ("SYSCTL1", REG_SYSCTL1),
    ("OPC_QDOWN", REG_OPC_QDOWN),
    ("SYSCTL5", REG_SYSCTL5),
    ("ONPAD_CTL", REG_ONPAD_CTL),
    ("SWREG1", REG_SWREG1),
];

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    name: String,
    #[tabled(rename = "Cx")]
    cx: bool,
    #[tabled(rename = "Packet Size")]
    packet_size: usize,
    #[tabled(rename = "Enabled")]
    enabled: bool,
}

#[derive(Tabled)]
struct RegisterRow {
    #[tabled(rename = "Register")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn handle_probe(config: FspConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let bus = SharedBus::new(SimulatedPad::new());
    let mut driver = Driver::new(bus.clone(), config)?;
    driver.enable(true)?;

    let device = DeviceRow {
        name: driver.info().to_string(),
        cx: driver.info().is_cx(),
        packet_size: driver.packet_size(),
        enabled: driver.is_enabled(),
    };
    let mut table = Table::new(vec![device]);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Finger-Sensing-Pad"));
    println!("{table}");

    // Read back through the command channel so the register protocol is exercised
    let mut registers = Vec::with_capacity(PROBED_REGISTERS.len());
    for (name, address) in PROBED_REGISTERS {
        let value = bus.with(|bus| read_register(bus, address))?;
        registers.push(RegisterRow {
            name: name.to_string(),
            address: format!("{address:#04x}"),
            value: format!("{value:#04x}"),
        });
    }
    let mut table = Table::new(registers);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Registers"));
    println!("{table}");

    Ok(())
}
