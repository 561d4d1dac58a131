use std::{io, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivers::fsp::{GESTURE_LOCKOUT, MOMENTUM_INTERVAL, TYPING_SUPPRESSION};


/// Represents all possible errors loading a [FspConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Driver settings. Every field has a default so a partial (or empty) file
/// is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct FspConfig {
    /// Report clicks made by pressing on the pad surface
    pub clicking: bool,
    /// Ignore all pad input for this long after a key press
    pub typing_suppression_ms: u64,
    /// Ignore absolute motion for this long after a gesture ends
    pub gesture_lockout_ms: u64,
    /// Interval between momentum scroll events after a fling
    pub momentum_interval_ms: u64,
    /// Switch the pad to 4-byte packets when it supports it
    pub intellimouse: bool,
    /// Have the pad tag on-pad clicks so they can be told apart
    pub opc_tag: bool,
    /// Enable absolute coordinates and gesture notifications (Cx pads)
    pub absolute_mode: bool,
}

impl Default for FspConfig {
    fn default() -> Self {
        Self {
            clicking: true,
            typing_suppression_ms: TYPING_SUPPRESSION.as_millis() as u64,
            gesture_lockout_ms: GESTURE_LOCKOUT.as_millis() as u64,
            momentum_interval_ms: MOMENTUM_INTERVAL.as_millis() as u64,
            intellimouse: true,
            opc_tag: true,
            absolute_mode: true,
        }
    }
}

impl FspConfig {
    /// Load a [FspConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<FspConfig, LoadError> {
        let config: FspConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [FspConfig] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<FspConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: FspConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn typing_suppression(&self) -> Duration {
        Duration::from_millis(self.typing_suppression_ms)
    }

    pub fn gesture_lockout(&self) -> Duration {
        Duration::from_millis(self.gesture_lockout_ms)
    }

    pub fn momentum_interval(&self) -> Duration {
        Duration::from_millis(self.momentum_interval_ms)
    }
}
