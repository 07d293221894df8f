//! Adapter implementations of the port traits.
//!
//! `live` talks to the real vault and upload server, `recording` wraps the
//! live adapters and captures every call, `replaying` serves calls back from
//! cassettes.

pub mod live;
pub mod recording;
pub mod replaying;
