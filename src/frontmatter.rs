//! YAML front matter lookups.

use serde::de::DeserializeOwned;
use tracing::debug;

/// Front matter block at the very top of `text`, without its fences.
fn block(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Value of `key` in the document's front matter, if present and of type `T`.
#[must_use]
pub fn frontmatter_value<T: DeserializeOwned>(text: &str, key: &str) -> Option<T> {
    let yaml = block(text)?;
    let mapping: serde_yaml::Mapping = match serde_yaml::from_str(yaml) {
        Ok(mapping) => mapping,
        Err(e) => {
            debug!(error = %e, "front matter is not a YAML mapping");
            return None;
        }
    };
    let value = mapping.get(key)?.clone();
    serde_yaml::from_value(value).ok()
}
