//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette file paths. Ports without a cassette path panic if
/// called during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Path to the document store cassette file.
    pub store: Option<PathBuf>,
    /// Path to the transfer backend cassette file.
    pub transfer: Option<PathBuf>,
    /// Path to the ID generator cassette file.
    pub id_gen: Option<PathBuf>,
}

/// Per-port replayers, each with its own interaction stream.
pub struct PortReplayers {
    /// Replayer for the document store.
    pub store: Option<CassetteReplayer>,
    /// Replayer for the transfer backend.
    pub transfer: Option<CassetteReplayer>,
    /// Replayer for the ID generator.
    pub id_gen: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Points every port at the cassette files of one recording directory,
    /// skipping ports whose file is missing.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let port = |name: &str| {
            let path = dir.join(format!("{name}.cassette.yaml"));
            path.is_file().then_some(path)
        };
        Self { store: port("store"), transfer: port("transfer"), id_gen: port("id_gen") }
    }

    /// Load one cassette file and create a replayer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(CassetteReplayer::new(&cassette))
    }

    /// Load all configured cassette files and create replayers.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        Ok(PortReplayers {
            store: self.store.as_deref().map(Self::load_cassette).transpose()?,
            transfer: self.transfer.as_deref().map(Self::load_cassette).transpose()?,
            id_gen: self.id_gen.as_deref().map(Self::load_cassette).transpose()?,
        })
    }
}
