use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

const URL_SCHEME: &str = "blob:sheetbridge/";

/// Registry of live object-URLs backing binary artifacts. The registry is
/// the only owner of the bytes; once a URL is revoked the payload is gone.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    entries: Mutex<HashMap<String, Bytes>>,
    next_id: AtomicU64,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, bytes: Bytes) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let url = format!("{URL_SCHEME}{id}");
        self.entries
            .lock()
            .expect("object url registry")
            .insert(url.clone(), bytes);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.entries
            .lock()
            .expect("object url registry")
            .get(url)
            .cloned()
    }

    /// Revoking an unknown or already-revoked URL is a no-op, not an error.
    pub fn revoke(&self, url: &str) -> bool {
        self.entries
            .lock()
            .expect("object url registry")
            .remove(url)
            .is_some()
    }

    /// Number of live URLs; zero after every artifact has been released.
    pub fn active_count(&self) -> usize {
        self.entries.lock().expect("object url registry").len()
    }
}
