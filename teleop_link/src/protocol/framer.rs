//! Wire framing.
//!
//! ```text
//! Base frame:  0xFF | left | right | [mid] | armOrSignal
//! Gain sub-frame, only when left == right == armOrSignal == SET_GAINS:
//!   tag ('E' | 'M')
//!   4 × (len | ASCII text)        P, I, D, scale
//!   checksum = low byte of sum(tag, lengths, text)
//! ```
//!
//! Ordinary commands are guarded on the way in ([`CommandSet::ordinary`]),
//! so the gain key can only be produced by [`CommandSet::set_gains`].
//! The framer performs no I/O; each [`Frame`] is written by the sink as
//! one uninterrupted sequence.

use thiserror::Error;

use teleop_common::consts::{MAX_FRAME_LEN, MAX_GAIN_TEXT_LEN, START_BYTE, ZERO_COMMAND};
use teleop_common::link::profile::DriveChannels;
use teleop_common::link::types::{GainSet, MotorCommand, ReservedBand, ReservedSignal};

use crate::control::shaper::DriveCommand;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("gain {field} text is {len} bytes, limit {MAX_GAIN_TEXT_LEN}")]
    GainTextTooLong { field: &'static str, len: usize },

    #[error("gain {field} text is not ASCII")]
    GainTextNotAscii { field: &'static str },

    #[error("frame exceeds {MAX_FRAME_LEN} bytes")]
    Capacity,
}

/// What the arm slot of a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmSlot {
    /// Ordinary position or deviation command, already guarded.
    Command(MotorCommand),
    /// Intentional reserved-band signal.
    Signal(ReservedSignal),
}

/// The values of one base frame, before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSet {
    pub left: MotorCommand,
    pub right: MotorCommand,
    pub mid: Option<MotorCommand>,
    pub arm: ArmSlot,
}

impl CommandSet {
    /// Ordinary frame. Drive values equal to the gain key are nudged by +1
    /// and arm values inside the reserved band move above it.
    pub fn ordinary(drive: DriveCommand, arm: MotorCommand, band: &ReservedBand) -> Self {
        Self {
            left: band.guard_drive(drive.left),
            right: band.guard_drive(drive.right),
            mid: drive.mid.map(|m| band.guard_drive(m)),
            arm: ArmSlot::Command(band.guard_arm(arm)),
        }
    }

    /// Drive values with a signal in the arm slot.
    pub fn signal(drive: DriveCommand, signal: ReservedSignal, band: &ReservedBand) -> Self {
        if signal == ReservedSignal::SetGains {
            return Self::set_gains(drive_channels(&drive), band);
        }
        Self {
            left: band.guard_drive(drive.left),
            right: band.guard_drive(drive.right),
            mid: drive.mid.map(|m| band.guard_drive(m)),
            arm: ArmSlot::Signal(signal),
        }
    }

    /// Gain-update key: left, right and arm all carry SET_GAINS, motors
    /// otherwise hold still.
    pub fn set_gains(channels: DriveChannels, band: &ReservedBand) -> Self {
        Self {
            left: band.set_gains,
            right: band.set_gains,
            mid: neutral_mid(channels),
            arm: ArmSlot::Signal(ReservedSignal::SetGains),
        }
    }

    /// All motors stopped, arm holding.
    pub const fn neutral(channels: DriveChannels) -> Self {
        Self {
            left: ZERO_COMMAND,
            right: ZERO_COMMAND,
            mid: neutral_mid(channels),
            arm: ArmSlot::Command(ZERO_COMMAND),
        }
    }

    #[inline]
    pub const fn is_gain_key(&self) -> bool {
        matches!(self.arm, ArmSlot::Signal(ReservedSignal::SetGains))
    }

    /// Wire value of the arm slot.
    #[inline]
    pub const fn arm_value(&self, band: &ReservedBand) -> u8 {
        match self.arm {
            ArmSlot::Command(v) => v,
            ArmSlot::Signal(s) => band.value(s),
        }
    }
}

const fn neutral_mid(channels: DriveChannels) -> Option<MotorCommand> {
    match channels {
        DriveChannels::Two => None,
        DriveChannels::Three => Some(ZERO_COMMAND),
    }
}

const fn drive_channels(drive: &DriveCommand) -> DriveChannels {
    match drive.mid {
        Some(_) => DriveChannels::Three,
        None => DriveChannels::Two,
    }
}

/// One encoded frame, base plus optional gain sub-frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    bytes: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.bytes.push(byte).map_err(|_| FrameError::Capacity)
    }

    #[inline]
    fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.bytes
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::Capacity)
    }
}

/// Encodes command sets with the configured band and gains.
#[derive(Debug, Clone)]
pub struct ProtocolFramer {
    band: ReservedBand,
    gains: GainSet,
}

impl ProtocolFramer {
    pub fn new(band: ReservedBand, gains: GainSet) -> Self {
        Self { band, gains }
    }

    /// Encode a command set. A gain key is followed by the gain sub-frame.
    pub fn encode(&self, set: &CommandSet) -> Result<Frame, FrameError> {
        let mut frame = Frame::default();
        let key = self.band.set_gains;
        let arm = set.arm_value(&self.band);

        frame.push(START_BYTE)?;
        frame.push(set.left)?;
        frame.push(set.right)?;
        if let Some(mid) = set.mid {
            frame.push(mid)?;
        }
        frame.push(arm)?;

        if set.left == key && set.right == key && arm == key {
            self.encode_gains(&mut frame)?;
        }
        Ok(frame)
    }

    fn encode_gains(&self, frame: &mut Frame) -> Result<(), FrameError> {
        let start = frame.len();
        frame.push(self.gains.mode.tag())?;
        for (field, text) in self.gains.fields() {
            if !text.is_ascii() {
                return Err(FrameError::GainTextNotAscii { field });
            }
            if text.len() > MAX_GAIN_TEXT_LEN {
                return Err(FrameError::GainTextTooLong {
                    field,
                    len: text.len(),
                });
            }
            // Bounded by MAX_GAIN_TEXT_LEN above.
            frame.push(text.len() as u8)?;
            frame.extend(text.as_bytes())?;
        }
        let checksum = gain_checksum(&frame.as_bytes()[start..]);
        frame.push(checksum)
    }
}

/// Low byte of the sum of every sub-frame byte.
#[inline]
pub fn gain_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}
