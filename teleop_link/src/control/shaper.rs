//! Command shaping: analog axis → bounded motor command.
//!
//! Pure functions of their inputs and the configured profiles. The
//! pipeline is deadband → exponential curve (truncated toward zero) →
//! arcade mix → base offset in the direction of travel → joint scaling
//! → shift by [`ZERO_COMMAND`].
//!
//! Every output lies in `[ZERO - range, ZERO + range]`, which is a
//! subset of `[0, 254]` and therefore never equals the start byte.

use teleop_common::consts::{COMMAND_RANGE, MAX_CURVE_DEVIATION, ZERO_COMMAND};
use teleop_common::link::profile::{ArmConfig, DriveChannels, DriveConfig, ShapingProfile};
use teleop_common::link::types::MotorCommand;

/// Drive axis readings for one cycle, already mapped and inverted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveAxes {
    /// Forward/backward (Y).
    pub translation: f64,
    /// Turn (R). Positive turns right: left speeds up, right slows.
    pub rotation: f64,
    /// Sideways (X), three-channel drive only.
    pub lateral: f64,
}

/// Per-motor drive commands for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveCommand {
    pub left: MotorCommand,
    pub right: MotorCommand,
    /// Present only for three-channel drive.
    pub mid: Option<MotorCommand>,
}

impl DriveCommand {
    /// All motors stopped.
    pub const fn neutral(channels: DriveChannels) -> Self {
        Self {
            left: ZERO_COMMAND,
            right: ZERO_COMMAND,
            mid: match channels {
                DriveChannels::Two => None,
                DriveChannels::Three => Some(ZERO_COMMAND),
            },
        }
    }
}

/// Signed deviation from zero for one axis, truncated toward zero.
///
/// Magnitudes at or below the deadband read as exactly zero. NaN reads
/// as zero and out-of-range input is clamped to [-1.0, 1.0]. The curve
/// is capped at [`MAX_CURVE_DEVIATION`].
#[inline]
pub fn shape(raw: f64, profile: &ShapingProfile) -> i32 {
    if raw.is_nan() {
        return 0;
    }
    let raw = raw.clamp(-1.0, 1.0);
    let magnitude = raw.abs();
    if magnitude <= profile.deadband {
        return 0;
    }
    let curve = (((magnitude.powf(profile.exponent) / profile.normalizer).exp() - 1.0)
        * profile.endpoint)
        .min(MAX_CURVE_DEVIATION);
    // `as` truncates toward zero.
    (raw.signum() * curve) as i32
}

/// Add `base` to a nonzero deviation in its direction of travel.
#[inline]
pub const fn with_base_offset(deviation: i32, base: i32) -> i32 {
    match deviation {
        0 => 0,
        d if d > 0 => d.saturating_add(base),
        d => d.saturating_sub(base),
    }
}

/// Uniform factor that brings every value inside `[-range, range]`.
///
/// Chosen from whichever bound is violated by the larger magnitude.
/// Returns 1.0 when nothing exceeds the range, so a zero extreme never
/// reaches the division.
pub fn joint_scale(values: &[i32], range: i32) -> f64 {
    let max = values.iter().copied().max().unwrap_or(0);
    let min = values.iter().copied().min().unwrap_or(0);
    if max <= range && min >= -range {
        return 1.0;
    }
    if max > min.abs() {
        f64::from(range) / f64::from(max)
    } else {
        -f64::from(range) / f64::from(min)
    }
}

/// Shift a scaled deviation onto the unsigned command scale.
#[inline]
fn to_command(deviation: i32, scale: f64, range: i32) -> MotorCommand {
    let scaled = (f64::from(deviation) * scale).clamp(-f64::from(range), f64::from(range));
    let shifted = scaled + f64::from(ZERO_COMMAND);
    shifted.clamp(0.0, f64::from(u8::MAX - 1)) as MotorCommand
}

/// Arcade mix: `left = Y + R`, `right = Y - R`, `mid = X`.
///
/// Base offsets are applied per motor after mixing, then all motors are
/// scaled jointly so their proportions survive saturation.
pub fn mix_arcade(axes: &DriveAxes, drive: &DriveConfig) -> DriveCommand {
    let y = shape(axes.translation, &drive.translation);
    let r = shape(axes.rotation, &drive.rotation);

    let left = with_base_offset(y.saturating_add(r), drive.left_base);
    let right = with_base_offset(y.saturating_sub(r), drive.right_base);
    let range = drive.command_range;

    match (drive.channels, &drive.lateral) {
        (DriveChannels::Three, Some(lateral)) => {
            let mid = with_base_offset(shape(axes.lateral, lateral), lateral.base_offset);
            let scale = joint_scale(&[left, right, mid], range);
            DriveCommand {
                left: to_command(left, scale, range),
                right: to_command(right, scale, range),
                mid: Some(to_command(mid, scale, range)),
            }
        }
        // A three-channel layout without a lateral profile is rejected at
        // startup; an unconfigured mid motor stays stopped.
        (DriveChannels::Three, None) => {
            let scale = joint_scale(&[left, right], range);
            DriveCommand {
                left: to_command(left, scale, range),
                right: to_command(right, scale, range),
                mid: Some(ZERO_COMMAND),
            }
        }
        (DriveChannels::Two, _) => {
            let scale = joint_scale(&[left, right], range);
            DriveCommand {
                left: to_command(left, scale, range),
                right: to_command(right, scale, range),
                mid: None,
            }
        }
    }
}

/// Manual arm deviation: shaped, offset, then clamped to the full range.
#[inline]
pub fn shape_arm_manual(raw: f64, arm: &ArmConfig) -> i32 {
    with_base_offset(shape(raw, &arm.manual), arm.manual.base_offset)
        .clamp(-COMMAND_RANGE, COMMAND_RANGE)
}

/// Arm deviation to unsigned command. Callers guard the reserved band.
#[inline]
pub fn arm_command(deviation: i32) -> MotorCommand {
    to_command(deviation, 1.0, COMMAND_RANGE)
}
