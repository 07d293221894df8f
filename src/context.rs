//! Service context bundling the port trait objects and settings.

use std::path::{Path, PathBuf};

use crate::adapters::live::{LiveDocumentStore, LiveIdGenerator, LiveTransferBackend};
use crate::adapters::recording::{
    RecordingDocumentStore, RecordingIdGenerator, RecordingTransferBackend,
};
use crate::adapters::replaying::{
    ReplayingDocumentStore, ReplayingIdGenerator, ReplayingTransferBackend,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::config::Settings;
use crate::ports::documents::{DocumentStore, VaultFile};
use crate::ports::id_gen::IdGenerator;
use crate::ports::transfer::{FetchFuture, TransferBackend, UploadFuture};

/// Everything one pipeline call needs: the vault, the transfer backend,
/// the id source and the settings in force.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying).
pub struct ServiceContext {
    /// Vault documents and assets.
    pub store: Box<dyn DocumentStore>,
    /// Upload and download backend.
    pub transfer: Box<dyn TransferBackend>,
    /// Placeholder tokens and collision-free file names.
    pub id_gen: Box<dyn IdGenerator>,
    /// Settings loaded for this run.
    pub settings: Settings,
    /// Vault root on the host, used to hand absolute paths to the uploader.
    pub vault_root: PathBuf,
}

impl ServiceContext {
    /// Creates a live context over the vault at `vault_root`.
    #[must_use]
    pub fn live(vault_root: &Path, settings: Settings) -> Self {
        Self {
            store: Box::new(LiveDocumentStore::new(vault_root)),
            transfer: Box::new(LiveTransferBackend::new(settings.upload_server.clone())),
            id_gen: Box::new(LiveIdGenerator::new()),
            settings,
            vault_root: vault_root.to_path_buf(),
        }
    }

    /// Creates a live context whose port interactions are recorded into
    /// cassettes under `cassette_dir`.
    ///
    /// Drop the context before calling [`RecordingSession::finish`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created.
    pub fn recording(
        cassette_dir: &Path,
        vault_root: &Path,
        settings: Settings,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(cassette_dir, vault_root)?;
        let live = Self::live(vault_root, settings);
        let ctx = Self {
            store: Box::new(RecordingDocumentStore::new(live.store, session.store.clone())),
            transfer: Box::new(RecordingTransferBackend::new(
                live.transfer,
                session.transfer.clone(),
            )),
            id_gen: Box::new(RecordingIdGenerator::new(live.id_gen, session.id_gen.clone())),
            settings: live.settings,
            vault_root: live.vault_root,
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette use a panicking adapter that
    /// fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying(
        config: &CassetteConfig,
        vault_root: &Path,
        settings: Settings,
    ) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            store: match replayers.store {
                Some(r) => Box::new(ReplayingDocumentStore::new(r)),
                None => Box::new(PanickingDocumentStore),
            },
            transfer: match replayers.transfer {
                Some(r) => Box::new(ReplayingTransferBackend::new(r)),
                None => Box::new(PanickingTransferBackend),
            },
            id_gen: match replayers.id_gen {
                Some(r) => Box::new(ReplayingIdGenerator::new(r)),
                None => Box::new(PanickingIdGenerator),
            },
            settings,
            vault_root: vault_root.to_path_buf(),
        })
    }

    /// Assembles a context from explicit adapters.
    #[must_use]
    pub fn from_parts(
        store: Box<dyn DocumentStore>,
        transfer: Box<dyn TransferBackend>,
        id_gen: Box<dyn IdGenerator>,
        settings: Settings,
        vault_root: impl Into<PathBuf>,
    ) -> Self {
        Self { store, transfer, id_gen, settings, vault_root: vault_root.into() }
    }

    /// Host path handed to the uploader for a vault file.
    #[must_use]
    pub fn host_path(&self, file: &VaultFile) -> String {
        self.vault_root.join(&file.path).display().to_string()
    }
}

// --- Panicking adapters for unspecified ports ---

fn unconfigured(port: &str) -> ! {
    panic!("{port} port not configured in CassetteConfig: no cassette loaded for {port}");
}

struct PanickingDocumentStore;
impl DocumentStore for PanickingDocumentStore {
    fn read(&self, _path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        unconfigured("store")
    }
    fn write(&self, _path: &str, _text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        unconfigured("store")
    }
    fn write_binary(
        &self,
        _path: &str,
        _bytes: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        unconfigured("store")
    }
    fn list_files(&self) -> Result<Vec<VaultFile>, Box<dyn std::error::Error + Send + Sync>> {
        unconfigured("store")
    }
    fn exists(&self, _path: &str) -> bool {
        unconfigured("store")
    }
    fn trash(&self, _path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        unconfigured("store")
    }
}

struct PanickingTransferBackend;
impl TransferBackend for PanickingTransferBackend {
    fn upload_local(&self, _items: &[String]) -> UploadFuture<'_> {
        unconfigured("transfer")
    }
    fn fetch_remote(&self, _url: &str) -> FetchFuture<'_> {
        unconfigured("transfer")
    }
}

struct PanickingIdGenerator;
impl IdGenerator for PanickingIdGenerator {
    fn generate_id(&self) -> String {
        unconfigured("id_gen")
    }
}
