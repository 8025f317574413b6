//! Arm mode state machine: Manual ↔ Automatic.
//!
//! Manual input always wins. A nonzero manual deviation (analog or
//! override buttons) or an exit request forces Manual. Otherwise the arm
//! stays Automatic, or becomes Automatic on an explicit enter request.
//!
//! The machine starts in Manual and never in Automatic.

use teleop_common::link::profile::ArmPresets;
use teleop_common::link::types::{ArmMode, AutoHeight, MotorCommand};

use crate::control::shaper::arm_command;

/// Arm inputs for one cycle, already decoded from the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmInputs {
    /// Shaped manual deviation, or the override deviation while an
    /// override button is held.
    pub manual_deviation: i32,
    /// Preset requested for automatic mode.
    pub height: AutoHeight,
    /// Explicit request to enter automatic mode.
    pub enter_auto: bool,
    /// Explicit request to return to manual mode.
    pub exit_auto: bool,
}

/// Outcome of one arm cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmDecision {
    pub mode: ArmMode,
    /// Ordinary arm command before reserved-band guarding.
    pub command: MotorCommand,
    /// Mode differs from the one reported on the previous cycle.
    pub transitioned: bool,
}

/// Arm mode manager holding the current and last reported mode.
#[derive(Debug, Clone)]
pub struct ArmModeStateMachine {
    mode: ArmMode,
    reported: ArmMode,
    presets: ArmPresets,
}

impl ArmModeStateMachine {
    /// Create a new machine in Manual mode.
    pub const fn new(presets: ArmPresets) -> Self {
        Self {
            mode: ArmMode::Manual,
            reported: ArmMode::Manual,
            presets,
        }
    }

    /// Current mode.
    #[inline]
    pub const fn mode(&self) -> ArmMode {
        self.mode
    }

    /// Next mode for the given inputs, without mutating.
    pub const fn next_mode(&self, inputs: &ArmInputs) -> ArmMode {
        if inputs.manual_deviation != 0 || inputs.exit_auto {
            ArmMode::Manual
        } else if matches!(self.mode, ArmMode::Automatic) || inputs.enter_auto {
            ArmMode::Automatic
        } else {
            ArmMode::Manual
        }
    }

    /// Advance one cycle.
    pub fn step(&mut self, inputs: &ArmInputs) -> ArmDecision {
        let next = self.next_mode(inputs);
        let transitioned = next != self.reported;
        self.mode = next;
        self.reported = next;

        let command = match next {
            ArmMode::Manual => arm_command(inputs.manual_deviation),
            ArmMode::Automatic => self.presets.position(inputs.height),
        };

        ArmDecision {
            mode: next,
            command,
            transitioned,
        }
    }

    /// Fall back to Manual after a link failure.
    ///
    /// The last reported mode is kept, so if the arm was Automatic the
    /// first live cycle reports the edge and the receiver is told.
    #[inline]
    pub fn force_manual(&mut self) {
        self.mode = ArmMode::Manual;
    }
}
