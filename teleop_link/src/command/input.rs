//! Controller decoding: InputSample → drive axes, arm inputs, requests.
//!
//! Reset-position and send-gains fire on the rising edge, so a held
//! button produces exactly one event. Enter/exit-auto and stop are level
//! requests.

use bitflags::bitflags;

use teleop_common::link::config::{AxisBinding, MappingConfig};
use teleop_common::link::profile::ArmConfig;
use teleop_common::link::types::{AutoHeight, InputSample};

use crate::control::shaper::{DriveAxes, shape_arm_manual};
use crate::state::arm::ArmInputs;

bitflags! {
    /// Operator requests raised in one cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OperatorRequests: u8 {
        /// Enter automatic arm mode (level).
        const ENTER_AUTO     = 0x01;
        /// Leave automatic arm mode (level).
        const EXIT_AUTO      = 0x02;
        /// Zero the arm position (rising edge).
        const RESET_POSITION = 0x04;
        /// Send the configured gains (rising edge).
        const SEND_GAINS     = 0x08;
        /// Send neutral and shut down (level).
        const STOP           = 0x10;
    }
}

impl OperatorRequests {
    /// Requests that fire only on the press, not while held.
    pub const EDGE_MASK: Self = Self::from_bits_truncate(
        Self::RESET_POSITION.bits() | Self::SEND_GAINS.bits(),
    );
}

/// Everything the cycle needs from one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedInput {
    pub drive: DriveAxes,
    pub arm: ArmInputs,
    pub requests: OperatorRequests,
}

/// Applies the configured mapping and tracks button edges.
#[derive(Debug, Clone)]
pub struct ControllerDecoder {
    mapping: MappingConfig,
    arm: ArmConfig,
    held: OperatorRequests,
}

impl ControllerDecoder {
    pub fn new(mapping: MappingConfig, arm: ArmConfig) -> Self {
        Self {
            mapping,
            arm,
            held: OperatorRequests::empty(),
        }
    }

    pub fn decode(&mut self, sample: &InputSample) -> DecodedInput {
        let axes = &self.mapping.axes;
        let drive = DriveAxes {
            translation: read_axis(sample, axes.translation),
            rotation: read_axis(sample, axes.rotation),
            lateral: axes.lateral.map_or(0.0, |b| read_axis(sample, b)),
        };

        let held = self.held_requests(sample);
        let pressed = held & !self.held;
        self.held = held;
        let edge = OperatorRequests::EDGE_MASK;
        let requests = (held - edge) | (pressed & edge);

        let arm = ArmInputs {
            manual_deviation: self.arm_deviation(sample),
            height: self.auto_height(sample),
            enter_auto: requests.contains(OperatorRequests::ENTER_AUTO),
            exit_auto: requests.contains(OperatorRequests::EXIT_AUTO),
        };

        DecodedInput {
            drive,
            arm,
            requests,
        }
    }

    fn held_requests(&self, sample: &InputSample) -> OperatorRequests {
        let b = &self.mapping.buttons;
        let mut held = OperatorRequests::empty();
        for (button, flag) in [
            (b.enter_auto, OperatorRequests::ENTER_AUTO),
            (b.exit_auto, OperatorRequests::EXIT_AUTO),
            (b.reset_position, OperatorRequests::RESET_POSITION),
            (b.send_gains, OperatorRequests::SEND_GAINS),
            (b.stop, OperatorRequests::STOP),
        ] {
            if pressed(sample, button) {
                held |= flag;
            }
        }
        held
    }

    /// Override buttons take precedence over the analog reading.
    fn arm_deviation(&self, sample: &InputSample) -> i32 {
        let b = &self.mapping.buttons;
        match (pressed(sample, b.arm_raise), pressed(sample, b.arm_lower)) {
            (true, false) => return self.arm.override_deviation,
            (false, true) => return -self.arm.override_deviation,
            _ => {}
        }

        let axes = &self.mapping.axes;
        let raise = read_axis(sample, axes.arm_manual);
        let raw = match axes.arm_lower {
            // Triggers rest at -1.0 and read +1.0 fully pulled.
            Some(lower) => (raise + 1.0) / 2.0 - (read_axis(sample, lower) + 1.0) / 2.0,
            None => raise,
        };
        shape_arm_manual(raw, &self.arm)
    }

    fn auto_height(&self, sample: &InputSample) -> AutoHeight {
        let held = self
            .mapping
            .buttons
            .auto_height
            .iter()
            .filter(|&&i| sample.button(i))
            .count();
        AutoHeight::from_held_count(held as u8)
    }
}

#[inline]
fn read_axis(sample: &InputSample, binding: AxisBinding) -> f64 {
    let v = sample.axis(binding.index);
    if binding.invert { -v } else { v }
}

#[inline]
fn pressed(sample: &InputSample, button: Option<usize>) -> bool {
    button.is_some_and(|i| sample.button(i))
}
