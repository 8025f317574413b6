//! Integration test: arm mode transitions and their signal frames.

use std::time::Instant;

use teleop_common::link::types::ArmMode;

use super::common::*;

#[test]
fn entering_auto_signals_three_times_then_holds_preset() {
    let t0 = Instant::now();
    let auto = sample(&[], &[BUTTON_ENTER_AUTO]);
    let mut cl = default_loop(std::iter::repeat_n(auto, 4), t0);

    run_cycles(&mut cl, t0, 4);
    assert_eq!(cl.arm().mode(), ArmMode::Automatic);
    assert_eq!(
        cl.sink().frames(),
        &[
            frame(&[0xFF, 127, 127, 124]),
            frame(&[0xFF, 127, 127, 124]),
            frame(&[0xFF, 127, 127, 124]),
            // Preset "down" with no height buttons held.
            frame(&[0xFF, 127, 127, 0]),
        ]
    );
}

#[test]
fn height_buttons_select_presets() {
    let t0 = Instant::now();
    let samples = [
        sample(&[], &[BUTTON_ENTER_AUTO]),
        sample(&[], &[]),
        sample(&[], &[]),
        sample(&[], &[5]),
        sample(&[], &[4, 5]),
    ];
    let mut cl = default_loop(samples, t0);
    run_cycles(&mut cl, t0, 5);

    let frames = cl.sink().frames();
    assert_eq!(frames.len(), 5);
    // Automatic mode persists after the enter button is released.
    assert_eq!(frames[3], frame(&[0xFF, 127, 127, 20]));
    assert_eq!(frames[4], frame(&[0xFF, 127, 127, 80]));
}

#[test]
fn manual_input_overrides_auto() {
    let t0 = Instant::now();
    let mut samples = vec![sample(&[], &[BUTTON_ENTER_AUTO]); 4];
    // Enter button still held, but the arm stick moves: manual wins.
    samples.extend(std::iter::repeat_n(
        sample(&[(AXIS_ARM, 0.5)], &[BUTTON_ENTER_AUTO]),
        4,
    ));
    let mut cl = default_loop(samples, t0);

    run_cycles(&mut cl, t0, 4);
    cl.sink_mut().take_frames();
    run_cycles(&mut cl, t0 + 40 * MS, 4);

    assert_eq!(cl.arm().mode(), ArmMode::Manual);
    assert_eq!(
        cl.sink().frames(),
        &[
            frame(&[0xFF, 127, 127, 125]),
            frame(&[0xFF, 127, 127, 125]),
            frame(&[0xFF, 127, 127, 125]),
            frame(&[0xFF, 127, 127, 167]),
        ]
    );
}

#[test]
fn signal_frames_carry_current_drive() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_Y, 0.6)], &[BUTTON_ENTER_AUTO])], t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 177, 178, 124])]);
}

#[test]
fn manual_arm_value_never_lands_in_reserved_band() {
    // Sweep the arm stick: every ordinary arm byte stays outside 123..=126.
    let t0 = Instant::now();
    let samples: Vec<_> = (-100..=100)
        .map(|i| sample(&[(AXIS_ARM, f64::from(i) / 100.0)], &[]))
        .collect();
    let n = samples.len() as u32;
    let mut cl = default_loop(samples, t0);
    run_cycles(&mut cl, t0, n);

    for f in cl.sink().frames() {
        assert!(!(123..=126).contains(&f[3]), "arm byte {} in band", f[3]);
    }
}
