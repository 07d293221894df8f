//! Cassettes: recorded port interactions used to replay runs deterministically.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
