//! Integration test: reset and gain events on the wire.

use std::time::Instant;

use teleop_common::link::config::LinkConfig;
use teleop_common::link::types::GainMode;
use teleop_link::io::source::ScriptedSource;
use teleop_link::protocol::framer::gain_checksum;

use super::common::*;

fn gain_frame() -> Vec<u8> {
    let mut expected = vec![0xFF, 126, 126, 126, b'E'];
    for text in ["0.43", "0.0001", "0.05", "20"] {
        expected.push(text.len() as u8);
        expected.extend_from_slice(text.as_bytes());
    }
    expected.push(0x5E);
    expected
}

#[test]
fn gain_button_sends_gain_frame_three_times() {
    let t0 = Instant::now();
    let held = sample(&[], &[BUTTON_SEND_GAINS]);
    let mut samples = vec![held; 5];
    samples.push(sample(&[], &[]));
    let mut cl = default_loop(samples, t0);

    // Held for five cycles: one event, sent three times.
    run_cycles(&mut cl, t0, 5);
    assert_eq!(cl.sink_mut().take_frames(), vec![gain_frame(); 3]);

    // Release: the ordinary neutral frame replaces the gain key.
    cl.step(t0 + 50 * MS).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&NEUTRAL)]);
}

#[test]
fn gain_frame_ignores_drive_input() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_Y, 0.6)], &[BUTTON_SEND_GAINS])], t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[gain_frame()]);
}

#[test]
fn configured_gains_and_mode_are_sent() {
    let mut config = LinkConfig::default();
    config.gains.mode = GainMode::Measurement;
    config.gains.p = "1.5".to_string();
    config.gains.i = "0".to_string();
    config.gains.d = "0.25".to_string();
    config.gains.scale = "100".to_string();
    config.validate().unwrap();

    let t0 = Instant::now();
    let source = ScriptedSource::new([sample(&[], &[BUTTON_SEND_GAINS])]);
    let mut cl = control_loop(&config, source, t0);
    cl.step(t0).unwrap();

    let bytes = &cl.sink().frames()[0];
    let sub = &bytes[4..];
    assert_eq!(sub[0], b'M');
    assert_eq!(&sub[1..5], &[3, b'1', b'.', b'5']);
    assert_eq!(*sub.last().unwrap(), gain_checksum(&sub[..sub.len() - 1]));
}

#[test]
fn reset_button_sends_reset_signal() {
    let t0 = Instant::now();
    let mut cl = default_loop(vec![sample(&[], &[BUTTON_RESET]); 4], t0);
    run_cycles(&mut cl, t0, 4);
    assert_eq!(
        cl.sink().frames(),
        &[
            frame(&[0xFF, 127, 127, 123]),
            frame(&[0xFF, 127, 127, 123]),
            frame(&[0xFF, 127, 127, 123]),
            frame(&NEUTRAL),
        ]
    );
}

#[test]
fn simultaneous_events_go_out_in_priority_order() {
    let t0 = Instant::now();
    let both = sample(&[], &[BUTTON_ENTER_AUTO, BUTTON_RESET, BUTTON_SEND_GAINS]);
    let mut cl = default_loop(vec![both; 9], t0);
    run_cycles(&mut cl, t0, 9);

    let arm_bytes: Vec<u8> = cl.sink().frames().iter().map(|f| f[3]).collect();
    assert_eq!(arm_bytes, vec![124, 124, 124, 123, 123, 123, 126, 126, 126]);
    assert_eq!(cl.scheduler().dropped_events(), 0);
}
