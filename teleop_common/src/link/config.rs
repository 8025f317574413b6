//! Link configuration model.
//!
//! One TOML file drives the whole link. Every section carries defaults
//! equal to the reference tuning, so an empty file is a complete and
//! valid configuration.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "teleop-link"
//!
//! [serial]
//! device = "/dev/ttyUSB0"
//! baud_rate = 57600
//!
//! [timing]
//! cycle_period_ms = 10
//! max_quiet_ms = 50
//! dead_interval_ms = 1000
//! resend_count = 3
//! dead_repeat_count = 3
//!
//! [mapping.axes]
//! translation = { index = 1, invert = true }
//! rotation = { index = 4, invert = true }
//! arm_manual = { index = 2, invert = true }
//!
//! [mapping.buttons]
//! auto_height = [4, 5]
//! enter_auto = 0
//! reset_position = 7
//! send_gains = 6
//! stop = 1
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    CYCLE_PERIOD_MS_DEFAULT, DEAD_INTERVAL_MS_DEFAULT, DEAD_REPEAT_COUNT_DEFAULT,
    DEFAULT_BAUD_RATE, DEFAULT_SERIAL_DEVICE, MAX_INPUT_AXES, MAX_INPUT_BUTTONS,
    MAX_QUIET_MS_DEFAULT, RESEND_COUNT_DEFAULT,
};
use crate::link::profile::{ArmConfig, DriveChannels, DriveConfig};
use crate::link::types::{GainSet, ReservedBand};

/// Complete link configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    pub shared: SharedConfig,
    pub serial: SerialConfig,
    pub timing: TimingConfig,
    pub drive: DriveConfig,
    pub arm: ArmConfig,
    pub protocol: ReservedBand,
    pub gains: GainSet,
    pub mapping: MappingConfig,
}

impl LinkConfig {
    /// Validate every section. Any failure is fatal at startup.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` naming the first inconsistent field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.serial
            .validate()
            .and_then(|()| self.timing.validate())
            .and_then(|()| self.protocol.validate())
            .and_then(|()| self.drive.validate())
            .and_then(|()| self.arm.validate(&self.protocol))
            .and_then(|()| self.gains.validate())
            .and_then(|()| self.mapping.validate())
            .and_then(|()| self.validate_lateral_binding())
            .map_err(ConfigError::ValidationError)
    }

    fn validate_lateral_binding(&self) -> Result<(), String> {
        if self.drive.channels == DriveChannels::Three && self.mapping.axes.lateral.is_none() {
            return Err("three-channel drive requires mapping.axes.lateral".to_string());
        }
        Ok(())
    }
}

/// Serial byte sink parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    pub device: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_SERIAL_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl SerialConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.device.is_empty() {
            return Err("serial.device cannot be empty".to_string());
        }
        if self.baud_rate == 0 {
            return Err("serial.baud_rate must be > 0".to_string());
        }
        Ok(())
    }
}

/// Loop, keep-alive and watchdog timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Sleep between control cycles [ms].
    pub cycle_period_ms: u64,
    /// Longest silence before an unchanged frame is re-sent [ms].
    pub max_quiet_ms: u64,
    /// Input must change within this interval or the link is DEAD [ms].
    pub dead_interval_ms: u64,
    /// Total transmissions of an event frame (mode edge, reset, gains).
    pub resend_count: u8,
    /// Neutral frames per dead-link burst.
    pub dead_repeat_count: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: CYCLE_PERIOD_MS_DEFAULT,
            max_quiet_ms: MAX_QUIET_MS_DEFAULT,
            dead_interval_ms: DEAD_INTERVAL_MS_DEFAULT,
            resend_count: RESEND_COUNT_DEFAULT,
            dead_repeat_count: DEAD_REPEAT_COUNT_DEFAULT,
        }
    }
}

impl TimingConfig {
    #[inline]
    pub const fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }

    #[inline]
    pub const fn max_quiet(&self) -> Duration {
        Duration::from_millis(self.max_quiet_ms)
    }

    #[inline]
    pub const fn dead_interval(&self) -> Duration {
        Duration::from_millis(self.dead_interval_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, ms) in [
            ("cycle_period_ms", self.cycle_period_ms),
            ("max_quiet_ms", self.max_quiet_ms),
            ("dead_interval_ms", self.dead_interval_ms),
        ] {
            if ms == 0 {
                return Err(format!("timing.{name} must be > 0"));
            }
        }
        if self.resend_count == 0 {
            return Err("timing.resend_count must be >= 1".to_string());
        }
        if self.dead_repeat_count == 0 {
            return Err("timing.dead_repeat_count must be >= 1".to_string());
        }
        Ok(())
    }
}

/// One controller axis bound to a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisBinding {
    pub index: usize,
    #[serde(default)]
    pub invert: bool,
}

impl AxisBinding {
    pub const fn new(index: usize, invert: bool) -> Self {
        Self { index, invert }
    }
}

/// Axis-to-function mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisMapping {
    pub translation: AxisBinding,
    pub rotation: AxisBinding,
    /// Required for three-channel drive.
    pub lateral: Option<AxisBinding>,
    /// Analog arm input (a stick, or the raise trigger when `arm_lower` is set).
    pub arm_manual: AxisBinding,
    /// Lower trigger for split-trigger arm control. Triggers rest at -1.0.
    pub arm_lower: Option<AxisBinding>,
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self {
            translation: AxisBinding::new(1, true),
            rotation: AxisBinding::new(4, true),
            lateral: None,
            arm_manual: AxisBinding::new(2, true),
            arm_lower: None,
        }
    }
}

/// Button-to-function mapping. `None` leaves a function unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonMapping {
    /// Held count of this pair selects the automatic height preset.
    pub auto_height: [usize; 2],
    pub enter_auto: Option<usize>,
    pub exit_auto: Option<usize>,
    pub reset_position: Option<usize>,
    pub send_gains: Option<usize>,
    pub stop: Option<usize>,
    /// Discrete arm override, raise direction.
    pub arm_raise: Option<usize>,
    /// Discrete arm override, lower direction.
    pub arm_lower: Option<usize>,
}

impl Default for ButtonMapping {
    fn default() -> Self {
        Self {
            auto_height: [4, 5],
            enter_auto: Some(0),
            exit_auto: None,
            reset_position: Some(7),
            send_gains: Some(6),
            stop: Some(1),
            arm_raise: None,
            arm_lower: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    pub axes: AxisMapping,
    pub buttons: ButtonMapping,
}

impl MappingConfig {
    pub fn validate(&self) -> Result<(), String> {
        let axes = [
            ("translation", Some(self.axes.translation)),
            ("rotation", Some(self.axes.rotation)),
            ("lateral", self.axes.lateral),
            ("arm_manual", Some(self.axes.arm_manual)),
            ("arm_lower", self.axes.arm_lower),
        ];
        for (name, binding) in axes {
            if let Some(b) = binding.filter(|b| b.index >= MAX_INPUT_AXES) {
                return Err(format!(
                    "mapping.axes.{name} index {} >= {MAX_INPUT_AXES}",
                    b.index
                ));
            }
        }

        let b = &self.buttons;
        let buttons = [
            ("auto_height[0]", Some(b.auto_height[0])),
            ("auto_height[1]", Some(b.auto_height[1])),
            ("enter_auto", b.enter_auto),
            ("exit_auto", b.exit_auto),
            ("reset_position", b.reset_position),
            ("send_gains", b.send_gains),
            ("stop", b.stop),
            ("arm_raise", b.arm_raise),
            ("arm_lower", b.arm_lower),
        ];
        for (name, index) in buttons {
            if let Some(i) = index.filter(|&i| i >= MAX_INPUT_BUTTONS) {
                return Err(format!(
                    "mapping.buttons.{name} index {i} >= {MAX_INPUT_BUTTONS}"
                ));
            }
        }
        if b.auto_height[0] == b.auto_height[1] {
            return Err("mapping.buttons.auto_height must name two distinct buttons".to_string());
        }
        Ok(())
    }
}
