//! Protocol value types.
//!
//! Enums use `#[repr(u8)]` and closed variant sets so every consumer
//! matches exhaustively. `ReservedBand` and `GainSet` double as config
//! sections and deserialize with defaults from [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::{
    MAX_GAIN_TEXT_LEN, MAX_INPUT_AXES, MAX_INPUT_BUTTONS, RESERVED_BAND_MAX, RESERVED_BAND_MIN,
    RESERVED_ENTER_AUTO, RESERVED_ENTER_MANUAL, RESERVED_RESET_POSITION, RESERVED_SET_GAINS,
    START_BYTE, ZERO_COMMAND,
};
use crate::link::error::InputError;

/// Unsigned motor command on the wire. [`ZERO_COMMAND`] means no power.
pub type MotorCommand = u8;

// ─── Arm ────────────────────────────────────────────────────────────

/// Arm control mode.
///
/// Startup and failure default is `Manual`; the arm never starts in
/// automatic control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ArmMode {
    /// Operator drives the arm directly.
    #[default]
    Manual = 0,
    /// Arm tracks one of the configured height presets.
    Automatic = 1,
}

/// Preset selected while the arm is in automatic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AutoHeight {
    #[default]
    Down = 0,
    OverBumps = 1,
    Up = 2,
}

impl AutoHeight {
    /// Map the number of held height buttons (0, 1 or 2) to a preset.
    #[inline]
    pub const fn from_held_count(held: u8) -> Self {
        match held {
            0 => Self::Down,
            1 => Self::OverBumps,
            _ => Self::Up,
        }
    }
}

// ─── Reserved signalling ────────────────────────────────────────────

/// Out-of-band signal carried in the reserved band of the arm channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReservedSignal {
    /// Zero the arm position on the receiver.
    ResetPosition = 0,
    /// Arm switched to automatic control.
    EnterAuto = 1,
    /// Arm switched to manual control.
    EnterManual = 2,
    /// Gain update follows (left, right and arm all carry this value).
    SetGains = 3,
}

impl ReservedSignal {
    pub const ALL: [Self; 4] = [
        Self::ResetPosition,
        Self::EnterAuto,
        Self::EnterManual,
        Self::SetGains,
    ];

    /// Signal announcing that the arm entered `mode`.
    #[inline]
    pub const fn entering(mode: ArmMode) -> Self {
        match mode {
            ArmMode::Manual => Self::EnterManual,
            ArmMode::Automatic => Self::EnterAuto,
        }
    }
}

/// Contiguous band of command values repurposed as signals.
///
/// # TOML Example
///
/// ```toml
/// [protocol]
/// band_min = 123
/// band_max = 126
/// reset_position = 123
/// enter_auto = 124
/// enter_manual = 125
/// set_gains = 126
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReservedBand {
    pub band_min: u8,
    pub band_max: u8,
    pub reset_position: u8,
    pub enter_auto: u8,
    pub enter_manual: u8,
    pub set_gains: u8,
}

impl Default for ReservedBand {
    fn default() -> Self {
        Self {
            band_min: RESERVED_BAND_MIN,
            band_max: RESERVED_BAND_MAX,
            reset_position: RESERVED_RESET_POSITION,
            enter_auto: RESERVED_ENTER_AUTO,
            enter_manual: RESERVED_ENTER_MANUAL,
            set_gains: RESERVED_SET_GAINS,
        }
    }
}

impl ReservedBand {
    /// Wire value of a signal.
    #[inline]
    pub const fn value(&self, signal: ReservedSignal) -> u8 {
        match signal {
            ReservedSignal::ResetPosition => self.reset_position,
            ReservedSignal::EnterAuto => self.enter_auto,
            ReservedSignal::EnterManual => self.enter_manual,
            ReservedSignal::SetGains => self.set_gains,
        }
    }

    /// Whether `value` falls inside the band.
    #[inline]
    pub const fn contains(&self, value: u8) -> bool {
        value >= self.band_min && value <= self.band_max
    }

    /// Move an ordinary arm command out of the band (to `band_max + 1`).
    #[inline]
    pub const fn guard_arm(&self, value: u8) -> u8 {
        if self.contains(value) {
            self.band_max.saturating_add(1)
        } else {
            value
        }
    }

    /// Nudge an ordinary drive command off the gain-update key.
    ///
    /// Only `set_gains` is reserved on the drive channels, so this is
    /// lossy for exactly one legal value.
    #[inline]
    pub const fn guard_drive(&self, value: u8) -> u8 {
        if value == self.set_gains {
            value.saturating_add(1)
        } else {
            value
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.band_min > self.band_max {
            return Err(format!(
                "reserved band_min {} > band_max {}",
                self.band_min, self.band_max
            ));
        }
        // band_max + 1 is the landing value of guarded arm commands.
        if self.band_max >= START_BYTE - 1 {
            return Err(format!(
                "reserved band_max {} leaves no room below start byte {:#04x}",
                self.band_max, START_BYTE
            ));
        }
        if self.contains(ZERO_COMMAND) {
            return Err(format!(
                "reserved band {}..={} overlaps zero command {}",
                self.band_min, self.band_max, ZERO_COMMAND
            ));
        }
        for (i, a) in ReservedSignal::ALL.iter().enumerate() {
            let va = self.value(*a);
            if !self.contains(va) {
                return Err(format!(
                    "{a:?} value {va} outside reserved band {}..={}",
                    self.band_min, self.band_max
                ));
            }
            for b in &ReservedSignal::ALL[i + 1..] {
                if va == self.value(*b) {
                    return Err(format!("{a:?} and {b:?} share reserved value {va}"));
                }
            }
        }
        Ok(())
    }
}

// ─── Gains ──────────────────────────────────────────────────────────

/// How the receiver interprets a gain update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainMode {
    /// Error-based gains (tag `E`).
    #[default]
    Error,
    /// Measurement-based gains (tag `M`).
    Measurement,
}

impl GainMode {
    /// Sub-frame tag byte.
    #[inline]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Error => b'E',
            Self::Measurement => b'M',
        }
    }
}

/// Gains sent on explicit request, kept as decimal text so the wire
/// carries exactly what the operator configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainSet {
    pub mode: GainMode,
    /// Proportional gain.
    pub p: String,
    /// Integral gain.
    pub i: String,
    /// Derivative gain.
    pub d: String,
    /// Scale factor.
    pub scale: String,
}

impl Default for GainSet {
    fn default() -> Self {
        Self {
            mode: GainMode::Error,
            p: "0.43".to_string(),
            i: "0.0001".to_string(),
            d: "0.05".to_string(),
            scale: "20".to_string(),
        }
    }
}

impl GainSet {
    /// Fields in wire order: P, I, D, scale.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("p", self.p.as_str()),
            ("i", self.i.as_str()),
            ("d", self.d.as_str()),
            ("scale", self.scale.as_str()),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, text) in self.fields() {
            if text.is_empty() {
                return Err(format!("gain {name} is empty"));
            }
            if !text.is_ascii() {
                return Err(format!("gain {name} '{text}' is not ASCII"));
            }
            if text.len() > MAX_GAIN_TEXT_LEN {
                return Err(format!(
                    "gain {name} '{text}' longer than {MAX_GAIN_TEXT_LEN} bytes"
                ));
            }
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => {}
                _ => return Err(format!("gain {name} '{text}' is not a decimal number")),
            }
        }
        Ok(())
    }
}

// ─── Input ──────────────────────────────────────────────────────────

/// One snapshot of the controller, refreshed once per cycle.
///
/// Axis values are nominally in [-1.0, 1.0]; readers go through
/// [`InputSample::axis`] which sanitizes out-of-range and NaN values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    #[serde(default)]
    pub axes: heapless::Vec<f64, MAX_INPUT_AXES>,
    #[serde(default)]
    pub buttons: heapless::Vec<bool, MAX_INPUT_BUTTONS>,
}

impl InputSample {
    /// Build a sample from slices.
    ///
    /// # Errors
    /// `InputError::Malformed` if either slice exceeds the sample capacity.
    pub fn from_slices(axes: &[f64], buttons: &[bool]) -> Result<Self, InputError> {
        let mut sample = Self::default();
        sample.axes.extend_from_slice(axes).map_err(|_| {
            InputError::Malformed(format!(
                "{} axes exceed capacity {MAX_INPUT_AXES}",
                axes.len()
            ))
        })?;
        sample.buttons.extend_from_slice(buttons).map_err(|_| {
            InputError::Malformed(format!(
                "{} buttons exceed capacity {MAX_INPUT_BUTTONS}",
                buttons.len()
            ))
        })?;
        Ok(sample)
    }

    /// Axis reading clamped to [-1.0, 1.0]. Missing axes and NaN read as 0.0.
    #[inline]
    pub fn axis(&self, index: usize) -> f64 {
        match self.axes.get(index) {
            Some(v) if v.is_nan() => 0.0,
            Some(v) => v.clamp(-1.0, 1.0),
            None => 0.0,
        }
    }

    /// Button reading. Missing buttons read as released.
    #[inline]
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    #[inline]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    #[inline]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }
}
