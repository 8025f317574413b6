//! # Teleop Link Library
//!
//! Operator command link for a remotely driven vehicle with an arm.
//! Each fixed-period cycle reads one controller sample, shapes it into
//! bounded motor commands, runs the arm mode machine and the link
//! watchdog, and hands at most one frame to the serial sink.
//!
//! ## Pipeline
//!
//! 1. **InputSource**: one `InputSample` per cycle
//! 2. **LinkWatchdog**: ALIVE / DEAD from input liveness
//! 3. **ControllerDecoder**: axes, arm inputs, operator requests
//! 4. **CommandShaper**: curve, deadband, arcade mix, joint scaling
//! 5. **ArmModeStateMachine**: Manual / Automatic
//! 6. **TransmissionScheduler**: which frame, if any, goes out
//! 7. **ProtocolFramer** → **ByteSink**: wire bytes
//!
//! Per-cycle work allocates nothing: frames, samples and the event queue
//! are fixed-capacity `heapless` buffers.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod io;
pub mod protocol;
pub mod safety;
pub mod state;
