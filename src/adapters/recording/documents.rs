//! Recording adapter for the `DocumentStore` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{record_interaction, record_result};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::documents::{DocumentStore, VaultFile};

/// Records document store interactions while delegating to an inner store.
pub struct RecordingDocumentStore {
    inner: Box<dyn DocumentStore>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingDocumentStore {
    /// Creates a recording store wrapping the given implementation.
    pub fn new(inner: Box<dyn DocumentStore>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct PathInput<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct WriteInput<'a> {
    path: &'a str,
    text: &'a str,
}

/// Asset bytes are not stored in the cassette, only their size.
#[derive(Serialize)]
struct WriteBinaryInput<'a> {
    path: &'a str,
    len: usize,
}

impl DocumentStore for RecordingDocumentStore {
    fn read(&self, path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.read(path);
        record_result(&self.recorder, "store", "read", &PathInput { path }, &result);
        result
    }

    fn write(&self, path: &str, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.write(path, text);
        record_result(&self.recorder, "store", "write", &WriteInput { path, text }, &result);
        result
    }

    fn write_binary(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.write_binary(path, bytes);
        let input = WriteBinaryInput { path, len: bytes.len() };
        record_result(&self.recorder, "store", "write_binary", &input, &result);
        result
    }

    fn list_files(&self) -> Result<Vec<VaultFile>, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.list_files();
        record_result(&self.recorder, "store", "list_files", &(), &result);
        result
    }

    fn exists(&self, path: &str) -> bool {
        let result = self.inner.exists(path);
        record_interaction(&self.recorder, "store", "exists", &PathInput { path }, &result);
        result
    }

    fn trash(&self, path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.trash(path);
        record_result(&self.recorder, "store", "trash", &PathInput { path }, &result);
        result
    }
}
