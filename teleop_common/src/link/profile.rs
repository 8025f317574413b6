//! Command shaping profiles for the drive and the arm.
//!
//! Immutable for the process lifetime. Defaults reproduce the reference
//! tuning of the arcade drive and the trigger-driven arm.

use serde::{Deserialize, Serialize};

use crate::consts::{COMMAND_RANGE, CURVE_NORMALIZER, MAX_CURVE_DEVIATION, START_BYTE};
use crate::link::types::{AutoHeight, ReservedBand};

/// Response curve parameters for one input axis.
///
/// `deviation = sign * (e^(|raw|^exponent / normalizer) - 1) * endpoint`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapingProfile {
    /// Growth coefficient, typically 1.0–4.0.
    pub exponent: f64,
    /// Maximum deviation from zero.
    pub endpoint: f64,
    /// Inputs with magnitude at or below this read as zero.
    pub deadband: f64,
    /// Minimum nonzero command magnitude when this axis drives a motor directly.
    pub base_offset: i32,
    /// Exponential normalization constant.
    pub normalizer: f64,
}

impl Default for ShapingProfile {
    fn default() -> Self {
        Self {
            exponent: 1.5,
            endpoint: COMMAND_RANGE as f64,
            deadband: 0.10,
            base_offset: 0,
            normalizer: CURVE_NORMALIZER,
        }
    }
}

impl ShapingProfile {
    /// Rotation default: softer endpoint so turning never saturates the drive.
    pub fn rotation() -> Self {
        Self {
            endpoint: 50.0,
            ..Self::default()
        }
    }

    /// Manual arm default: no deadband, base offset to overcome the gearbox.
    pub fn arm_manual() -> Self {
        Self {
            deadband: 0.0,
            base_offset: 5,
            ..Self::default()
        }
    }

    /// Curve value at full deflection, before scaling.
    pub fn peak_deviation(&self) -> f64 {
        ((1.0 / self.normalizer).exp() - 1.0) * self.endpoint
    }

    pub fn validate(&self, name: &str, command_range: i32) -> Result<(), String> {
        if !self.exponent.is_finite() || self.exponent <= 0.0 {
            return Err(format!("{name}.exponent {} must be > 0", self.exponent));
        }
        if !self.endpoint.is_finite() || self.endpoint <= 0.0 || self.endpoint > command_range as f64
        {
            return Err(format!(
                "{name}.endpoint {} out of range (0, {command_range}]",
                self.endpoint
            ));
        }
        if !(0.0..1.0).contains(&self.deadband) {
            return Err(format!(
                "{name}.deadband {} out of range [0, 1)",
                self.deadband
            ));
        }
        if self.base_offset < 0 || self.base_offset >= command_range {
            return Err(format!(
                "{name}.base_offset {} out of range [0, {command_range})",
                self.base_offset
            ));
        }
        if !self.normalizer.is_finite() || self.normalizer <= 0.0 {
            return Err(format!("{name}.normalizer {} must be > 0", self.normalizer));
        }
        let peak = self.peak_deviation();
        if !peak.is_finite() || peak > MAX_CURVE_DEVIATION {
            return Err(format!(
                "{name} curve peaks at {peak} (normalizer {}), limit is {MAX_CURVE_DEVIATION}",
                self.normalizer
            ));
        }
        Ok(())
    }
}

/// Drive kinematic layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveChannels {
    /// Left and right motors (arcade).
    #[default]
    Two,
    /// Left, right and a lateral mid motor.
    Three,
}

/// Drive shaping configuration.
///
/// # TOML Example
///
/// ```toml
/// [drive]
/// channels = "two"
/// command_range = 127
/// left_base = 2
/// right_base = 3
///
/// [drive.rotation]
/// endpoint = 50.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    pub channels: DriveChannels,
    /// Maximum deviation of any motor command from zero.
    pub command_range: i32,
    /// Static-friction offset added to the left motor in the direction of travel.
    pub left_base: i32,
    /// Static-friction offset added to the right motor in the direction of travel.
    pub right_base: i32,
    pub translation: ShapingProfile,
    pub rotation: ShapingProfile,
    /// Lateral axis, required for three-channel drive. Its `base_offset`
    /// applies to the mid motor.
    pub lateral: Option<ShapingProfile>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            channels: DriveChannels::Two,
            command_range: COMMAND_RANGE,
            left_base: 2,
            right_base: 3,
            translation: ShapingProfile::default(),
            rotation: ShapingProfile::rotation(),
            lateral: None,
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.command_range < 1 || self.command_range > COMMAND_RANGE {
            return Err(format!(
                "drive.command_range {} out of range [1, {COMMAND_RANGE}]",
                self.command_range
            ));
        }
        for (name, base) in [("left_base", self.left_base), ("right_base", self.right_base)] {
            if base < 0 || base >= self.command_range {
                return Err(format!(
                    "drive.{name} {base} out of range [0, {})",
                    self.command_range
                ));
            }
        }
        self.translation
            .validate("drive.translation", self.command_range)?;
        self.rotation.validate("drive.rotation", self.command_range)?;
        match (self.channels, &self.lateral) {
            (DriveChannels::Three, Some(lateral)) => {
                lateral.validate("drive.lateral", self.command_range)
            }
            (DriveChannels::Three, None) => {
                Err("drive.channels = \"three\" requires [drive.lateral]".to_string())
            }
            (DriveChannels::Two, Some(_)) => {
                Err("[drive.lateral] given but drive.channels = \"two\"".to_string())
            }
            (DriveChannels::Two, None) => Ok(()),
        }
    }
}

/// Automatic-mode arm presets, sent as raw position values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArmPresets {
    pub down: u8,
    pub over_bumps: u8,
    pub up: u8,
}

impl Default for ArmPresets {
    fn default() -> Self {
        Self {
            down: 0,
            over_bumps: 20,
            up: 80,
        }
    }
}

impl ArmPresets {
    #[inline]
    pub const fn position(&self, height: AutoHeight) -> u8 {
        match height {
            AutoHeight::Down => self.down,
            AutoHeight::OverBumps => self.over_bumps,
            AutoHeight::Up => self.up,
        }
    }

    pub fn validate(&self, band: &ReservedBand) -> Result<(), String> {
        for (name, v) in [
            ("down", self.down),
            ("over_bumps", self.over_bumps),
            ("up", self.up),
        ] {
            if v == START_BYTE {
                return Err(format!("arm.presets.{name} equals start byte"));
            }
            if band.contains(v) {
                return Err(format!(
                    "arm.presets.{name} {v} inside reserved band {}..={}",
                    band.band_min, band.band_max
                ));
            }
        }
        Ok(())
    }
}

/// Arm shaping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArmConfig {
    /// Curve for the analog arm input.
    pub manual: ShapingProfile,
    /// Deviation commanded while a discrete raise/lower button is held.
    pub override_deviation: i32,
    pub presets: ArmPresets,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            manual: ShapingProfile::arm_manual(),
            override_deviation: 100,
            presets: ArmPresets::default(),
        }
    }
}

impl ArmConfig {
    pub fn validate(&self, band: &ReservedBand) -> Result<(), String> {
        self.manual.validate("arm.manual", COMMAND_RANGE)?;
        if self.override_deviation < 1 || self.override_deviation > COMMAND_RANGE {
            return Err(format!(
                "arm.override_deviation {} out of range [1, {COMMAND_RANGE}]",
                self.override_deviation
            ));
        }
        self.presets.validate(band)
    }
}
