//! Wire protocol root.

pub mod framer;
