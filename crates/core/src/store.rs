use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

/// A stored document. The id -> (title, text) pairing is fixed at creation;
/// only `meta` entries are added or overwritten afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub meta: BTreeMap<String, MetaValue>,
}

/// Closed set of metadata value shapes. Serialized untagged so the blob
/// stays plain JSON (`"share_token": "abc"`, not a wrapper object).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreBlob {
    docs: BTreeMap<String, Document>,
}

/// JSON-blob document store. Every mutating call performs a full
/// load-mutate-save cycle against the backing file.
///
/// There is no lock spanning a read-modify-write cycle: concurrent writers
/// can race and lose updates. Callers are expected to serialize mutations
/// themselves (single-writer contract).
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a new document and returns its freshly generated id.
    pub fn create(&self, title: &str, text: &str) -> Result<String> {
        let mut blob = self.load();
        let doc_id = Uuid::new_v4().to_string();
        blob.docs.insert(
            doc_id.clone(),
            Document {
                title: title.to_string(),
                text: text.to_string(),
                meta: BTreeMap::new(),
            },
        );
        self.save(&blob)?;
        debug!(doc_id = %doc_id, chars = text.len(), "document created");
        Ok(doc_id)
    }

    /// Returns the stored document, or `None` for an unknown id.
    pub fn get(&self, doc_id: &str) -> Result<Option<Document>> {
        Ok(self.load().docs.remove(doc_id))
    }

    /// Merges `key: value` into the document's metadata (last write wins)
    /// and persists. A missing id is a no-op.
    pub fn set_meta(&self, doc_id: &str, key: &str, value: MetaValue) -> Result<()> {
        let mut blob = self.load();
        if let Some(doc) = blob.docs.get_mut(doc_id) {
            doc.meta.insert(key.to_string(), value);
            self.save(&blob)?;
        }
        Ok(())
    }

    /// Full snapshot of the collection at call time.
    pub fn list(&self) -> Result<BTreeMap<String, Document>> {
        Ok(self.load().docs)
    }

    /// A missing or unreadable blob yields an empty store rather than an
    /// error; unreadable state is discarded on the next save.
    fn load(&self) -> StoreBlob {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return StoreBlob::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "store blob unreadable, starting empty");
                StoreBlob::default()
            }
        }
    }

    fn save(&self, blob: &StoreBlob) -> Result<()> {
        let raw = serde_json::to_string_pretty(blob)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
