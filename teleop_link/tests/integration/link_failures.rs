//! Integration test: sink failures, input failures and operator stop.

use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use teleop_common::link::config::LinkConfig;
use teleop_link::cycle::{ControlLoop, CycleOutcome, RunEnd};
use teleop_link::io::sink::MemorySink;
use teleop_link::io::source::ReplaySource;

use super::common::*;

#[test]
fn failed_event_write_is_retried_until_sent() {
    let t0 = Instant::now();
    let mut cl = default_loop(vec![sample(&[], &[BUTTON_RESET]); 5], t0);
    cl.sink_mut().fail_next(1);

    run_cycles(&mut cl, t0, 5);
    assert_eq!(cl.stats().write_failures, 1);
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
fn failed_dead_burst_is_retried() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_Y, 1.0)], &[])], t0);
    cl.step(t0).unwrap();
    cl.sink_mut().take_frames();

    cl.sink_mut().fail_next(1);
    cl.step(t0 + 1000 * MS).unwrap();
    assert!(cl.sink().frames().is_empty());
    assert_eq!(cl.stats().write_failures, 1);

    // Not recorded as sent: the whole burst goes out on the next cycle.
    cl.step(t0 + 1010 * MS).unwrap();
    assert_eq!(cl.sink().frames(), &vec![frame(&NEUTRAL); 3]);
}

#[test]
fn stop_button_sends_single_neutral_and_ends_run() {
    let t0 = Instant::now();
    let mut cl = default_loop(
        [
            sample(&[(AXIS_Y, 1.0)], &[]),
            sample(&[(AXIS_Y, 1.0)], &[BUTTON_STOP]),
        ],
        t0,
    );
    let running = AtomicBool::new(true);
    assert_eq!(cl.run(&running, None).unwrap(), RunEnd::StopRequested);
    assert_eq!(
        cl.sink().frames(),
        &[frame(&[0xFF, 253, 254, 127]), frame(&NEUTRAL)]
    );
}

#[test]
fn stop_on_first_cycle() {
    let t0 = Instant::now();
    let mut cl = default_loop([sample(&[(AXIS_Y, 1.0)], &[BUTTON_STOP])], t0);
    // Stop is honoured even on the very first cycle.
    assert_eq!(cl.step(t0).unwrap(), CycleOutcome::Stopped);
    assert_eq!(cl.sink().frames(), &[frame(&NEUTRAL)]);
}

#[test]
fn malformed_replay_line_keeps_last_sample() {
    let text = "\
{\"axes\":[0.0,-0.6]}
this is not json
{\"axes\":[0.0,1.0]}
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
    assert_eq!(cl.stats().input_errors, 1);
    assert_eq!(cl.sink().frames().len(), 1);

    cl.step(t0 + 20 * MS).unwrap();
    assert_eq!(cl.sink().frames()[1], frame(&[0xFF, 0, 0, 127]));
}

#[test]
fn cycle_limit_ends_with_neutral() {
    let t0 = Instant::now();
    let mut cl = default_loop(vec![sample(&[(AXIS_Y, 0.6)], &[]); 3], t0);
    let running = AtomicBool::new(true);
    assert_eq!(cl.run(&running, Some(3)).unwrap(), RunEnd::CycleLimit);
    assert_eq!(cl.stats().cycle_count, 3);
    assert_eq!(cl.sink().frames().last(), Some(&frame(&NEUTRAL)));
}
