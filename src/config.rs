//! User settings for uploads, downloads and rendered markup.
//!
//! Settings are plain YAML. A vault may carry its own `.picflow.yaml`; an
//! explicit `--config` path wins over it. Missing keys take their defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::filter::BlockList;

/// File name looked up at the vault root when no config path is given.
pub const VAULT_CONFIG_FILE: &str = ".picflow.yaml";

/// Endpoint of a local PicGo / PicList server.
pub const DEFAULT_UPLOAD_SERVER: &str = "http://127.0.0.1:36677/upload";

/// How the display name of a rewritten image is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayNamePolicy {
    /// Keep the original name and append the size suffix.
    #[default]
    #[serde(rename = "origin", alias = "keep")]
    Keep,
    /// Always render an empty name.
    #[serde(rename = "none", alias = "blank")]
    Blank,
    /// Render an empty name only when the name is the default placeholder.
    #[serde(rename = "remove_default", alias = "removeDefault")]
    BlankIfDefault,
}

/// Settings consumed by every pipeline call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// PicGo-compatible upload endpoint.
    pub upload_server: String,
    /// Suffix appended to kept display names (e.g. `|300`).
    pub image_size_suffix: String,
    /// Display-name policy for rewritten markup.
    pub image_desc: DisplayNamePolicy,
    /// Whether remote images are re-uploaded as well.
    pub work_on_network: bool,
    /// Comma-joined list of domains whose images are never re-uploaded.
    pub network_black_domains: String,
    /// Trash local images after a successful upload.
    pub delete_source: bool,
    /// Upload pasted and dropped images automatically.
    pub upload_by_clip_switch: bool,
    /// Upload a pasted image even when the clipboard also carries text.
    pub apply_image: bool,
    /// Download folder. A leading `./` makes it relative to the document.
    pub attachment_folder: String,
    /// Name treated as "no real name" by [`DisplayNamePolicy::BlankIfDefault`].
    pub default_image_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_server: DEFAULT_UPLOAD_SERVER.to_string(),
            image_size_suffix: String::new(),
            image_desc: DisplayNamePolicy::Keep,
            work_on_network: false,
            network_black_domains: String::new(),
            delete_source: false,
            upload_by_clip_switch: true,
            apply_image: true,
            attachment_folder: "attachments".to_string(),
            default_image_name: "image.png".to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the YAML is invalid.
    pub fn from_yaml(text: &str) -> Result<Self, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&text)
    }

    /// Resolves settings for a run: explicit path, then the vault's own
    /// config file, then defaults. Environment overrides apply last.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when a config file exists but is invalid.
    pub fn discover(vault_root: &Path, explicit: Option<&Path>) -> Result<Self, PipelineError> {
        let mut settings = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidate = vault_root.join(VAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Applies `PICFLOW_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(server) = env::var("PICFLOW_UPLOAD_SERVER") {
            if !server.trim().is_empty() {
                self.upload_server = server;
            }
        }
    }

    /// The domain block list parsed from `network_black_domains`.
    #[must_use]
    pub fn block_list(&self) -> BlockList {
        BlockList::parse(&self.network_black_domains)
    }
}
