//! In-memory JSON document store
//!
//! Documents live in a fixed set of independently locked segments so that
//! handlers touching unrelated keys never wait on each other. Nothing is
//! persisted; the store lives exactly as long as the value that owns it.

pub mod segmented;

pub use segmented::{DocumentStore, DEFAULT_SEGMENTS};

/// A stored value: any JSON (null, bool, number, string, array, object).
pub type Document = serde_json::Value;
