//! Safety module root.
//!
//! Input liveness monitoring. A DEAD link forces neutral output.

pub mod watchdog;
