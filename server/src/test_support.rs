//! Test doubles for the storage seams.
//!
//! Compiled for unit tests and for the `test-support` feature used by the
//! integration tests in `server/tests/`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::db::StoredImage;
use crate::storage::{FetchError, ImageStore, RemoteImageFetcher, UploadError};

/// Image store that records every upload and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingImageStore {
    calls: AtomicUsize,
    fail_on_call: Mutex<Option<usize>>,
    folders: Mutex<Vec<String>>,
}

impl RecordingImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th upload (1-based) and every later one.
    pub fn fail_from_call(&self, n: usize) {
        if let Ok(mut slot) = self.fail_on_call.lock() {
            *slot = Some(n);
        }
    }

    /// Fail every upload.
    pub fn fail_always(&self) {
        self.fail_from_call(1);
    }

    /// Number of upload attempts, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Folders passed to successful uploads, in completion order.
    pub fn folders(&self) -> Vec<String> {
        self.folders.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, data: Bytes, folder: &str) -> Result<StoredImage, UploadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let failing = self
            .fail_on_call
            .lock()
            .ok()
            .and_then(|slot| *slot)
            .is_some_and(|n| call >= n);
        if failing {
            return Err(UploadError::Storage(format!("injected failure on call {call}")));
        }
        if data.is_empty() {
            return Err(UploadError::Empty);
        }

        if let Ok(mut folders) = self.folders.lock() {
            folders.push(folder.to_string());
        }
        let public_id = format!("{folder}/fake-{call}");
        Ok(StoredImage {
            url: format!("https://cdn.test/{public_id}"),
            public_id,
        })
    }
}

/// Fetcher that returns fixed bytes, or fails when unreachable.
#[derive(Debug)]
pub struct FakeFetcher {
    reachable: AtomicBool,
    calls: AtomicUsize,
    body: Bytes,
}

impl Default for FakeFetcher {
    fn default() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            body: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake-picture"),
        }
    }
}

impl FakeFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self) {
        self.reachable.store(false, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(self.body.clone())
        } else {
            Err(FetchError::Request(format!("{url}: connection refused")))
        }
    }
}
