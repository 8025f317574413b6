//! Shared fixtures for the integration tests.

use std::time::{Duration, Instant};

use teleop_common::link::config::LinkConfig;
use teleop_common::link::types::InputSample;
use teleop_link::cycle::ControlLoop;
use teleop_link::io::sink::MemorySink;
use teleop_link::io::source::ScriptedSource;

pub const MS: Duration = Duration::from_millis(1);

pub const NEUTRAL: [u8; 4] = [0xFF, 127, 127, 127];

// Default mapping: sticks on axes 1 (Y), 4 (R) and 2 (arm), all inverted.
pub const AXIS_Y: usize = 1;
pub const AXIS_R: usize = 4;
pub const AXIS_ARM: usize = 2;

pub const BUTTON_ENTER_AUTO: usize = 0;
pub const BUTTON_STOP: usize = 1;
pub const BUTTON_SEND_GAINS: usize = 6;
pub const BUTTON_RESET: usize = 7;

/// Sample in operator terms: positive values push forward / right / up.
pub fn sample(axes: &[(usize, f64)], buttons: &[usize]) -> InputSample {
    let mut a = [0.0; 6];
    for &(i, v) in axes {
        a[i] = -v;
    }
    let mut b = [false; 10];
    for &i in buttons {
        b[i] = true;
    }
    InputSample::from_slices(&a, &b).unwrap()
}

pub type TestLoop = ControlLoop<ScriptedSource, MemorySink>;

pub fn control_loop(config: &LinkConfig, source: ScriptedSource, t0: Instant) -> TestLoop {
    ControlLoop::new(config, source, MemorySink::new(), t0)
}

pub fn default_loop(samples: impl IntoIterator<Item = InputSample>, t0: Instant) -> TestLoop {
    control_loop(&LinkConfig::default(), ScriptedSource::new(samples), t0)
}

/// Step `cycles` times at the default 10 ms period starting at `from`.
pub fn run_cycles(cl: &mut TestLoop, from: Instant, cycles: u32) -> Instant {
    let mut now = from;
    for _ in 0..cycles {
        cl.step(now).unwrap();
        now += 10 * MS;
    }
    now
}

pub fn frame(bytes: &[u8]) -> Vec<u8> {
    bytes.to_vec()
}
