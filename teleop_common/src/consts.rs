//! Workspace-wide constants for the teleop link.
//!
//! Single source of truth for wire-level values and reference defaults.
//! Imported by all crates; do not duplicate these values.

use static_assertions::const_assert;

/// Sentinel byte that opens every base frame.
pub const START_BYTE: u8 = 0xFF;

/// Command value meaning "no motor power".
pub const ZERO_COMMAND: u8 = 127;

/// Maximum deviation (+/-) of a command from [`ZERO_COMMAND`].
pub const COMMAND_RANGE: i32 = 127;

/// Normalization constant of the exponential response curve.
pub const CURVE_NORMALIZER: f64 = 1.44;

/// Upper bound on a shaped curve value before mixing and scaling.
pub const MAX_CURVE_DEVIATION: f64 = 4.0 * COMMAND_RANGE as f64;

/// Default reserved band (inclusive bounds) and its named signals.
pub const RESERVED_BAND_MIN: u8 = 123;
pub const RESERVED_BAND_MAX: u8 = 126;
pub const RESERVED_RESET_POSITION: u8 = 123;
pub const RESERVED_ENTER_AUTO: u8 = 124;
pub const RESERVED_ENTER_MANUAL: u8 = 125;
pub const RESERVED_SET_GAINS: u8 = 126;

/// Maximum number of axes carried by one input sample.
pub const MAX_INPUT_AXES: usize = 16;

/// Maximum number of buttons carried by one input sample.
pub const MAX_INPUT_BUTTONS: usize = 32;

/// Maximum ASCII length of one gain field on the wire.
pub const MAX_GAIN_TEXT_LEN: usize = 16;

/// Base frame: start byte + left + right + optional mid + arm.
pub const MAX_BASE_FRAME_LEN: usize = 5;

/// Gain sub-frame: tag + 4 × (len + text) + checksum.
pub const MAX_GAIN_SUBFRAME_LEN: usize = 1 + 4 * (1 + MAX_GAIN_TEXT_LEN) + 1;

/// Capacity of one encoded frame buffer.
pub const MAX_FRAME_LEN: usize = MAX_BASE_FRAME_LEN + MAX_GAIN_SUBFRAME_LEN;

/// Default control cycle period [ms].
pub const CYCLE_PERIOD_MS_DEFAULT: u64 = 10;

/// Default maximum quiet interval between transmissions [ms].
pub const MAX_QUIET_MS_DEFAULT: u64 = 50;

/// Default watchdog dead interval [ms].
pub const DEAD_INTERVAL_MS_DEFAULT: u64 = 1000;

/// Default number of transmissions of an event frame.
pub const RESEND_COUNT_DEFAULT: u8 = 3;

/// Default number of neutral frames in a dead-link burst.
pub const DEAD_REPEAT_COUNT_DEFAULT: u8 = 3;

/// Default serial device.
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/ttyUSB0";

/// Default serial baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/link.toml";

const_assert!(RESERVED_BAND_MIN <= RESERVED_BAND_MAX);
const_assert!(RESERVED_BAND_MAX < START_BYTE - 1);
const_assert!(ZERO_COMMAND < RESERVED_BAND_MIN || ZERO_COMMAND > RESERVED_BAND_MAX);
const_assert!(ZERO_COMMAND as i32 + COMMAND_RANGE < START_BYTE as i32);
const_assert!(MAX_GAIN_TEXT_LEN <= u8::MAX as usize);
