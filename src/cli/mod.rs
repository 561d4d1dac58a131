pub mod decode;
pub mod probe;
pub mod replay;


use std::error::Error;

use clap::{Parser, Subcommand};
use decode::handle_decode;
use probe::handle_probe;
use replay::handle_replay;

use crate::config::FspConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Decode a single packet given as hex bytes
    Decode {
        /// Three or four packet bytes, e.g. 09 05 01
        bytes: Vec<String>,
    },
    /// Feed a capture of pad bytes through the driver and print the events
    Replay {
        /// Path to the capture file
        path: String,
        /// Path to a YAML driver configuration
        #[arg(long)]
        config: Option<String>,
    },
    /// Identify and enable the simulated pad and print its register state
    Probe {
        /// Path to a YAML driver configuration
        #[arg(long)]
        config: Option<String>,
    },
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(cmd) = args.cmd else {
        return Ok(());
    };

    match cmd {
        Commands::Decode { bytes } => handle_decode(bytes)?,
        Commands::Replay { path, config } => handle_replay(path, load_config(config)?).await?,
        Commands::Probe { config } => handle_probe(load_config(config)?)?,
    }

    Ok(())
}

/// Load the driver configuration from the given path, or use the defaults
fn load_config(path: Option<String>) -> Result<FspConfig, Box<dyn Error + Send + Sync>> {
    let Some(path) = path else {
        return Ok(FspConfig::default());
    };
    log::debug!("Loading configuration from {path}");
    Ok(FspConfig::from_yaml_file(path)?)
}

/// Parse a hex byte, with or without a leading "0x"
pub fn parse_hex_byte(value: &str) -> Result<u8, std::num::ParseIntError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u8::from_str_radix(digits, 16)
}
