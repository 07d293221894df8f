//! In-memory port fakes shared by unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::channel::oneshot;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::ports::documents::{DocumentStore, VaultFile};
use crate::ports::id_gen::IdGenerator;
use crate::ports::transfer::{
    FetchFuture, FetchResponse, TransferBackend, UploadFuture, UploadResponse,
};
use crate::vault_path;

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Default)]
struct MemState {
    files: BTreeMap<String, Vec<u8>>,
    trashed: Vec<String>,
    fail_trash: bool,
    listings: usize,
}

/// Vault held in memory. Clones share the same files.
#[derive(Clone, Default)]
pub(crate) struct MemStore {
    state: Arc<Mutex<MemState>>,
}

impl MemStore {
    pub(crate) fn with_files(files: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (path, text) in files {
            store.put(path, text);
        }
        store
    }

    pub(crate) fn put(&self, path: &str, text: &str) {
        self.state.lock().unwrap().files.insert(path.to_string(), text.as_bytes().to_vec());
    }

    pub(crate) fn text(&self, path: &str) -> String {
        let state = self.state.lock().unwrap();
        String::from_utf8(state.files.get(path).cloned().unwrap_or_default()).unwrap()
    }

    pub(crate) fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub(crate) fn trashed(&self) -> Vec<String> {
        self.state.lock().unwrap().trashed.clone()
    }

    /// Number of `list_files` calls so far.
    pub(crate) fn listings(&self) -> usize {
        self.state.lock().unwrap().listings
    }

    pub(crate) fn fail_trash(&self) {
        self.state.lock().unwrap().fail_trash = true;
    }
}

impl DocumentStore for MemStore {
    fn read(&self, path: &str) -> Result<String, BoxErr> {
        let state = self.state.lock().unwrap();
        let bytes = state.files.get(path).ok_or_else(|| format!("{path}: not found"))?;
        Ok(String::from_utf8(bytes.clone())?)
    }

    fn write(&self, path: &str, text: &str) -> Result<(), BoxErr> {
        self.write_binary(path, text.as_bytes())
    }

    fn write_binary(&self, path: &str, bytes: &[u8]) -> Result<(), BoxErr> {
        self.state.lock().unwrap().files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<VaultFile>, BoxErr> {
        let mut state = self.state.lock().unwrap();
        state.listings += 1;
        Ok(state.files.keys().map(|p| VaultFile::from_path(p.as_str())).collect())
    }

    fn exists(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        let folder = format!("{path}/");
        state.files.contains_key(path) || state.files.keys().any(|p| p.starts_with(&folder))
    }

    fn trash(&self, path: &str) -> Result<(), BoxErr> {
        let mut state = self.state.lock().unwrap();
        if state.fail_trash {
            return Err("trash unavailable".into());
        }
        state.files.remove(path).ok_or_else(|| format!("{path}: not found"))?;
        state.trashed.push(path.to_string());
        Ok(())
    }
}

type Gate = oneshot::Receiver<Result<UploadResponse, String>>;

#[derive(Default)]
struct TransferState {
    uploads: Vec<Vec<String>>,
    scripted: VecDeque<Result<UploadResponse, String>>,
    gates: VecDeque<Gate>,
    remote: HashMap<String, FetchResponse>,
    fetched: Vec<String>,
}

/// Transfer backend answering from scripts. Unscripted uploads succeed with
/// `https://cdn.test/<file name>` per item; unknown fetches answer 404.
#[derive(Clone, Default)]
pub(crate) struct FakeTransfer {
    state: Arc<Mutex<TransferState>>,
}

impl FakeTransfer {
    /// Queues the answer of the next upload call.
    pub(crate) fn script(&self, response: Result<UploadResponse, String>) {
        self.state.lock().unwrap().scripted.push_back(response);
    }

    /// Makes the next upload call wait until the returned sender fires.
    pub(crate) fn gate(&self) -> oneshot::Sender<Result<UploadResponse, String>> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().gates.push_back(rx);
        tx
    }

    pub(crate) fn serve(&self, url: &str, status: u16, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .remote
            .insert(url.to_string(), FetchResponse { status, bytes: bytes.to_vec() });
    }

    pub(crate) fn uploads(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched.clone()
    }
}

pub(crate) fn uploaded(urls: &[&str]) -> UploadResponse {
    UploadResponse { success: true, urls: urls.iter().map(|u| (*u).to_string()).collect(), message: None }
}

pub(crate) fn rejected(message: &str) -> UploadResponse {
    UploadResponse { success: false, urls: Vec::new(), message: Some(message.to_string()) }
}

impl TransferBackend for FakeTransfer {
    fn upload_local(&self, items: &[String]) -> UploadFuture<'_> {
        let (gate, scripted) = {
            let mut state = self.state.lock().unwrap();
            state.uploads.push(items.to_vec());
            let gate = state.gates.pop_front();
            let scripted = if gate.is_none() { state.scripted.pop_front() } else { None };
            (gate, scripted)
        };
        let default = UploadResponse {
            success: true,
            urls: items
                .iter()
                .map(|item| format!("https://cdn.test/{}", vault_path::file_name(item)))
                .collect(),
            message: None,
        };
        Box::pin(async move {
            let answer = match gate {
                Some(rx) => rx.await.map_err(|_| "gate dropped".to_string())?,
                None => scripted.unwrap_or(Ok(default)),
            };
            answer.map_err(Into::into)
        })
    }

    fn fetch_remote(&self, url: &str) -> FetchFuture<'_> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.fetched.push(url.to_string());
            state.remote.get(url).cloned()
        };
        Box::pin(async move {
            Ok(response.unwrap_or(FetchResponse { status: 404, bytes: Vec::new() }))
        })
    }
}

/// Ids `00001`, `00002`, ...
#[derive(Default)]
pub(crate) struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        format!("{:05}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub(crate) fn test_context(store: &MemStore, transfer: &FakeTransfer, settings: Settings) -> ServiceContext {
    ServiceContext::from_parts(
        Box::new(store.clone()),
        Box::new(transfer.clone()),
        Box::new(SequentialIds::default()),
        settings,
        "/vault",
    )
}
