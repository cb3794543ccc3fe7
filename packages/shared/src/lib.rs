//! Utilities shared by the Banter binaries and tests.

pub mod logger;
pub mod time;
