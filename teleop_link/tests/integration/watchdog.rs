//! Integration test: frozen input trips the watchdog and forces neutral.

use std::time::Instant;

use teleop_common::link::error::InputError;
use teleop_common::link::types::{ArmMode, InputSample};
use teleop_link::io::source::ScriptedSource;
use teleop_link::safety::watchdog::LinkStatus;

use super::common::*;

fn burst() -> Vec<Vec<u8>> {
    vec![frame(&NEUTRAL); 3]
}

#[test]
fn frozen_input_sends_neutral_bursts() {
    let t0 = Instant::now();
    // One sample, then the source is exhausted and the last one repeats.
    let mut cl = default_loop([sample(&[(AXIS_Y, 1.0)], &[])], t0);

    cl.step(t0).unwrap();
    cl.step(t0 + 990 * MS).unwrap();
    assert_eq!(cl.link_status(), LinkStatus::Alive);
    cl.sink_mut().take_frames();

    cl.step(t0 + 1000 * MS).unwrap();
    assert_eq!(cl.link_status(), LinkStatus::Dead);
    assert_eq!(cl.sink_mut().take_frames(), burst());

    // Within the quiet interval: nothing.
    cl.step(t0 + 1010 * MS).unwrap();
    assert!(cl.sink().frames().is_empty());

    // Quiet interval elapsed: another burst.
    cl.step(t0 + 1050 * MS).unwrap();
    assert_eq!(cl.sink_mut().take_frames(), burst());
    assert_eq!(cl.stats().dead_cycles, 3);
}

#[test]
fn moving_input_revives_the_link() {
    let t0 = Instant::now();
    let mut source = ScriptedSource::new([sample(&[(AXIS_Y, 1.0)], &[])]);
    source.push_error(InputError::Disconnected);
    source.push(sample(&[(AXIS_Y, 0.6)], &[]));
    let mut cl = control_loop(&Default::default(), source, t0);

    cl.step(t0).unwrap();
    cl.step(t0 + 1000 * MS).unwrap();
    assert_eq!(cl.link_status(), LinkStatus::Dead);
    cl.sink_mut().take_frames();

    cl.step(t0 + 1010 * MS).unwrap();
    assert_eq!(cl.link_status(), LinkStatus::Alive);
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 177, 178, 127])]);
    assert_eq!(cl.stats().input_errors, 1);
}

#[test]
fn dead_link_drops_auto_and_reports_manual_on_recovery() {
    let t0 = Instant::now();
    let mut source = ScriptedSource::new([sample(&[], &[BUTTON_ENTER_AUTO])]);
    source.push_error(InputError::Disconnected);
    source.push(sample(&[(0, 0.01)], &[]));
    let mut cl = control_loop(&Default::default(), source, t0);

    cl.step(t0).unwrap();
    assert_eq!(cl.arm().mode(), ArmMode::Automatic);

    cl.step(t0 + 1000 * MS).unwrap();
    assert_eq!(cl.arm().mode(), ArmMode::Manual);
    // The pending enter-auto repeats are abandoned for the burst.
    assert_eq!(cl.scheduler().repeats_remaining(), 0);
    cl.sink_mut().take_frames();

    cl.step(t0 + 1010 * MS).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 127, 127, 125])]);
}

#[test]
fn constant_nan_axis_is_frozen() {
    let t0 = Instant::now();
    let frozen = InputSample::from_slices(&[f64::NAN, 0.0], &[false]).unwrap();
    let mut cl = default_loop(std::iter::repeat_n(frozen, 3), t0);

    cl.step(t0).unwrap();
    cl.step(t0 + 500 * MS).unwrap();
    cl.step(t0 + 1000 * MS).unwrap();
    assert_eq!(cl.link_status(), LinkStatus::Dead);
}
