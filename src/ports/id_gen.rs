//! ID generator port for placeholder tokens and collision-free file names.

/// Generates unique identifiers.
///
/// Placeholder tokens and replacement file names both come from here, so
/// a replaying generator makes interactive sessions and downloads
/// deterministic under test.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier made of ASCII alphanumerics.
    fn generate_id(&self) -> String;
}
