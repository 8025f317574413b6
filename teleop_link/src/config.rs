//! Link configuration loading with validation.
//!
//! Parses `LinkConfig` from TOML, applies command-line overrides, then
//! runs the full validation pass. Any failure is fatal at startup.

use std::path::Path;

use teleop_common::config::{ConfigError, ConfigLoader};
use teleop_common::link::config::LinkConfig;

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub device: Option<String>,
    pub baud_rate: Option<u32>,
}

impl Overrides {
    fn apply(&self, config: &mut LinkConfig) {
        if let Some(device) = &self.device {
            config.serial.device.clone_from(device);
        }
        if let Some(baud) = self.baud_rate {
            config.serial.baud_rate = baud;
        }
    }
}

/// Load, override and validate the link configuration from a file.
///
/// Runs before the subscriber is installed, so it does not log; the
/// caller reports the result.
///
/// # Errors
/// `ConfigError::FileNotFound`, `ParseError` or `ValidationError`.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<LinkConfig, ConfigError> {
    let mut config = LinkConfig::load(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Same as [`load_config`] from TOML text.
pub fn load_config_from_str(
    content: &str,
    overrides: &Overrides,
) -> Result<LinkConfig, ConfigError> {
    let mut config = LinkConfig::from_toml_str(content)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// One-line summary of the settings that matter when reading logs.
pub fn summary(config: &LinkConfig) -> String {
    let t = &config.timing;
    format!(
        "device={} baud={} channels={:?} cycle={}ms quiet={}ms dead={}ms resend={} burst={}",
        config.serial.device,
        config.serial.baud_rate,
        config.drive.channels,
        t.cycle_period_ms,
        t.max_quiet_ms,
        t.dead_interval_ms,
        t.resend_count,
        t.dead_repeat_count,
    )
}
