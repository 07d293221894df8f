//! Domain Filter: keeps remote references away from blocked hosts.

use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::reference::Reference;

/// Domain substrings whose images are never re-uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockList {
    entries: Vec<String>,
}

impl BlockList {
    /// Parses a comma-joined list. Entries are trimmed and empty ones dropped.
    #[must_use]
    pub fn parse(joined: &str) -> Self {
        let entries = joined
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// Returns `true` when no domain is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the URL's host contains a blocked entry.
    ///
    /// A URL that cannot be parsed is never blocked.
    #[must_use]
    pub fn blocks(&self, url: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let host = match Url::parse(url) {
            Ok(parsed) => parsed.host_str().map(str::to_string),
            Err(e) => {
                debug!(url, error = %e, "unparsable url kept by domain filter");
                return false;
            }
        };
        host.is_some_and(|host| self.entries.iter().any(|entry| host.contains(entry.as_str())))
    }
}

/// Drops remote references whose host is blocked. Local references pass.
#[must_use]
pub fn filter(references: Vec<Reference>, block_list: &BlockList) -> Vec<Reference> {
    if block_list.is_empty() {
        return references;
    }
    references.into_iter().filter(|r| !r.is_remote() || !block_list.blocks(&r.path)).collect()
}

/// References eligible for upload: every local reference, plus remote ones
/// when network re-upload is on and their host is not blocked.
#[must_use]
pub fn select_candidates(references: Vec<Reference>, settings: &Settings) -> Vec<Reference> {
    let references = if settings.work_on_network {
        references
    } else {
        references.into_iter().filter(|r| !r.is_remote()).collect()
    };
    filter(references, &settings.block_list())
}
