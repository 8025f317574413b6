//! Command shaping root.
//!
//! Response curve, deadband, arcade mixing and joint scaling. Pure
//! functions of the current inputs and configuration.

pub mod shaper;
