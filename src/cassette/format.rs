//! Cassette data structures for recording and replaying interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded interaction with an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`store`, `transfer`, `id_gen`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// Output data returned from the port.
    pub output: serde_json::Value,
}

impl Interaction {
    /// Builds an interaction with a zero sequence number, for hand-written cassettes.
    #[must_use]
    pub fn new(
        port: &str,
        method: &str,
        input: serde_json::Value,
        output: serde_json::Value,
    ) -> Self {
        Self { seq: 0, port: port.into(), method: method.into(), input, output }
    }
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Vault root the run operated on.
    pub vault: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Builds a cassette from interactions, numbering them in order.
    #[must_use]
    pub fn from_interactions(name: &str, interactions: Vec<Interaction>) -> Self {
        let interactions = interactions
            .into_iter()
            .zip(0u64..)
            .map(|(interaction, seq)| Interaction { seq, ..interaction })
            .collect();
        Self { name: name.into(), recorded_at: Utc::now(), vault: String::new(), interactions }
    }
}
