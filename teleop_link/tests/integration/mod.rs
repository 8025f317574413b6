mod arm_modes;
mod common;
mod end_to_end;
mod gains;
mod link_failures;
mod watchdog;
