//! Segmented concurrent map of key -> document
//!
//! # Design
//!
//! - Key space split into N segments, each a `HashMap` behind its own mutex
//! - Segment picked by hashing the key with `FxHasher`
//! - Point operations lock exactly one segment
//! - Enumerations (`items`, `keys`, `count`) lock one segment at a time and
//!   accumulate, so they never stall the whole store
//!
//! # Consistency
//!
//! Operations on the same key are linearizable through the segment lock.
//! Enumerations are snapshot-like only: every entry returned was present at
//! some instant during the call, but entries mutated concurrently in other
//! segments may or may not show up.
//!
//! Documents are held behind `Arc`, so reads only bump a refcount while the
//! lock is held and serialization always happens outside of it.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHasher;
use tracing::debug;

use crate::Document;

/// Segment count used by [`DocumentStore::new`].
pub const DEFAULT_SEGMENTS: usize = 32;

type Segment = Mutex<HashMap<String, Arc<Document>>>;

/// Thread-safe document store shared by all request handlers.
pub struct DocumentStore {
    segments: Box<[Segment]>,
}

impl DocumentStore {
    /// Create an empty store with [`DEFAULT_SEGMENTS`] segments.
    pub fn new() -> Self {
        Self::with_segments(DEFAULT_SEGMENTS)
    }

    /// Create an empty store with `segments` segments (at least one).
    pub fn with_segments(segments: usize) -> Self {
        let n = segments.max(1);
        let segments = (0..n)
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        debug!(segments = n, "document store initialized");
        Self { segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    fn segment_index(&self, key: &str) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        // Fx mixes into the high bits; the low bits are weak.
        let hash = hasher.finish().rotate_right(32);
        (hash % self.segments.len() as u64) as usize
    }

    #[inline]
    fn segment(&self, key: &str) -> &Segment {
        &self.segments[self.segment_index(key)]
    }

    /// Latest document stored under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<Arc<Document>> {
        self.segment(key).lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.segment(key).lock().contains_key(key)
    }

    /// Insert or replace the document stored under `key`.
    pub fn set(&self, key: impl Into<String>, doc: Document) {
        let key = key.into();
        let doc = Arc::new(doc);
        let replaced = {
            let mut segment = self.segment(&key).lock();
            segment.insert(key, doc)
        };
        // the old document is freed after the guard is gone
        drop(replaced);
    }

    /// Insert or replace every pair. Each pair is atomic on its own; the batch
    /// as a whole is not.
    pub fn set_many<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (String, Document)>,
    {
        for (key, doc) in pairs {
            self.set(key, doc);
        }
    }

    /// Remove `key`. Removing an absent key is a no-op; returns whether a
    /// document was present.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.segment(key).lock().remove(key);
        removed.is_some()
    }

    /// Number of stored documents, summed segment by segment.
    pub fn count(&self) -> usize {
        self.segments.iter().map(|segment| segment.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| segment.lock().is_empty())
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for segment in self.segments.iter() {
            let segment = segment.lock();
            keys.extend(segment.keys().cloned());
        }
        keys
    }

    /// All key -> document pairs.
    pub fn items(&self) -> HashMap<String, Arc<Document>> {
        let mut items = HashMap::new();
        for segment in self.segments.iter() {
            let segment = segment.lock();
            items.extend(segment.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        }
        items
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("segments", &self.segments.len())
            .field("documents", &self.count())
            .finish()
    }
}
