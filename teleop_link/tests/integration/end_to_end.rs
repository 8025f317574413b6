//! Integration test: controller sample → shaped commands → wire bytes.

use std::io::Cursor;
use std::time::Instant;

use teleop_common::link::config::{AxisBinding, LinkConfig};
use teleop_common::link::profile::{DriveChannels, ShapingProfile};
use teleop_link::cycle::ControlLoop;
use teleop_link::io::sink::MemorySink;
use teleop_link::io::source::{ReplaySource, ScriptedSource};

use super::common::*;

#[test]
fn forward_stick_is_shaped_and_offset() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_Y, 0.6)], &[])], t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 177, 178, 127])]);
}

#[test]
fn arcade_fixtures() {
    let cases = [
        ((1.0, 0.0), [253, 254]),
        ((-1.0, 0.0), [0, 0]),
        ((1.0, 1.0), [254, 183]),
        ((1.0, -1.0), [182, 254]),
        ((0.5, 0.5), [177, 152]),
        ((-0.6, 0.3), [83, 70]),
        ((0.0, 1.0), [179, 74]),
        ((1.0, 0.5), [254, 231]),
    ];
    for ((y, r), [left, right]) in cases {
        let t0 = Instant::now();
        let mut cl = default_loop([sample(&[(AXIS_Y, y), (AXIS_R, r)], &[])], t0);
        cl.step(t0).unwrap();
        assert_eq!(
            cl.sink().frames(),
            &[frame(&[0xFF, left, right, 127])],
            "Y={y} R={r}"
        );
    }
}

#[test]
fn unchanged_input_waits_for_keep_alive() {
    let t0 = Instant::now();
    let held = sample(&[(AXIS_Y, 0.6)], &[]);
    let mut cl = default_loop(std::iter::repeat_n(held, 6), t0);

    // 0, 10, 20, 30, 40 ms: only the first cycle sends.
    run_cycles(&mut cl, t0, 5);
    assert_eq!(cl.sink().frames().len(), 1);

    // 50 ms: quiet interval elapsed, same bytes again.
    cl.step(t0 + 50 * MS).unwrap();
    let frames = cl.sink().frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], frames[1]);
}

#[test]
fn manual_arm_stick_drives_arm_byte() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_ARM, 0.5)], &[])], t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 127, 127, 167])]);
}

#[test]
fn three_channel_frame_carries_mid_motor() {
    let mut config = LinkConfig::default();
    config.drive.channels = DriveChannels::Three;
    config.drive.lateral = Some(ShapingProfile::default());
    config.mapping.axes.lateral = Some(AxisBinding::new(0, true));
    config.validate().unwrap();

    let t0 = Instant::now();
    let source = ScriptedSource::new([sample(&[(AXIS_Y, 1.0), (0, 1.0)], &[])]);
    let mut cl = control_loop(&config, source, t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 253, 254, 251, 127])]);
}

#[test]
fn three_channel_session_keeps_five_byte_frames() {
    let mut config = LinkConfig::default();
    config.drive.channels = DriveChannels::Three;
    config.drive.lateral = Some(ShapingProfile::default());
    config.mapping.axes.lateral = Some(AxisBinding::new(0, true));
    config.validate().unwrap();

    let t0 = Instant::now();
    let source = ScriptedSource::new([
        sample(&[(AXIS_Y, 1.0), (0, 1.0)], &[]),
        sample(&[(AXIS_Y, 1.0), (0, 1.0)], &[BUTTON_SEND_GAINS]),
    ]);
    let mut cl = control_loop(&config, source, t0);

    cl.step(t0).unwrap();
    assert_eq!(
        cl.sink_mut().take_frames(),
        vec![frame(&[0xFF, 253, 254, 251, 127])]
    );

    // Gain key holds the mid motor at zero.
    let mut gain_frame = vec![0xFF, 126, 126, 127, 126, b'E'];
    for text in ["0.43", "0.0001", "0.05", "20"] {
        gain_frame.push(text.len() as u8);
        gain_frame.extend_from_slice(text.as_bytes());
    }
    gain_frame.push(0x5E);
    run_cycles(&mut cl, t0 + 10 * MS, 3);
    assert_eq!(cl.sink_mut().take_frames(), vec![gain_frame; 3]);

    // Input frozen since the gain press: neutral burst on every motor.
    cl.step(t0 + 1100 * MS).unwrap();
    assert_eq!(
        cl.sink().frames(),
        vec![frame(&[0xFF, 127, 127, 127, 127]); 3].as_slice()
    );
}

#[test]
fn replayed_json_lines_reach_the_wire() {
    let text = "\
{\"axes\":[0.0,-0.6,0.0,0.0,0.0,0.0],\"buttons\":[]}
{\"axes\":[0.0,1.0,0.0,0.0,0.0,0.0],\"buttons\":[]}
";
    let t0 = Instant::now();
    let mut cl = ControlLoop::new(
        &LinkConfig::default(),
        ReplaySource::new(Cursor::new(text)),
        MemorySink::new(),
        t0,
    );
    cl.step(t0).unwrap();
    cl.step(t0 + 10 * MS).unwrap();
    assert_eq!(
        cl.sink().frames(),
        &[frame(&[0xFF, 177, 178, 127]), frame(&[0xFF, 0, 0, 127])]
    );
}

#[test]
fn shipped_config_drives_the_same_bytes() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/link.toml");
    let config = teleop_link::config::load_config(
        std::path::Path::new(path),
        &teleop_link::config::Overrides::default(),
    )
    .unwrap();

    let t0 = Instant::now();
    let source = ScriptedSource::new([sample(&[(AXIS_Y, 0.6)], &[])]);
    let mut cl = control_loop(&config, source, t0);
    cl.step(t0).unwrap();
    assert_eq!(cl.sink().frames(), &[frame(&[0xFF, 177, 178, 127])]);
}
