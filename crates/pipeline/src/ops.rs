//! The operations surface both transports call: each logical operation is
//! a plain function over validated inputs returning either a payload or a
//! structured [`DocChatError`], with no framing assumptions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use docchat_core::{
    extract_from_url, normalize, DocChatError, DocumentStore, MetaValue, Result,
};
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::facade::{flashcards, Flashcard, Generator};
use crate::share::{share, ShareArtifact};

pub struct DocChat {
    store: DocumentStore,
    generator: Generator,
    share_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub doc_id: String,
    pub title: String,
    pub chars: usize,
}

/// Listing entry: title and character count only, never the body text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocListing {
    pub title: String,
    pub chars: usize,
}

impl DocChat {
    pub fn new(store: DocumentStore, generator: Generator, share_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            generator,
            share_dir: share_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            DocumentStore::open(&settings.db_path),
            Generator::from_env(),
            &settings.share_dir,
        )
    }

    pub fn ingest_text(&self, title: &str, text: &str) -> Result<IngestReceipt> {
        if text.trim().is_empty() {
            return Err(DocChatError::InvalidInput("document text is empty"));
        }
        let doc_id = self.store.create(title, text)?;
        Ok(IngestReceipt {
            doc_id,
            title: title.to_string(),
            chars: text.len(),
        })
    }

    /// Ingests an uploaded file; an explicit title wins over the one
    /// derived from the filename.
    pub fn ingest_file(
        &self,
        filename: &str,
        data: &[u8],
        title_override: Option<&str>,
    ) -> Result<IngestReceipt> {
        let (inferred_title, text) = normalize(filename, data)?;
        let title = title_override.unwrap_or(&inferred_title);
        let doc_id = self.store.create(title, &text)?;
        info!(doc_id, filename, chars = text.len(), "file ingested");
        Ok(IngestReceipt {
            doc_id,
            title: title.to_string(),
            chars: text.len(),
        })
    }

    /// Ingests a web page; the URL doubles as the document title.
    pub fn ingest_url(&self, url: &str) -> Result<IngestReceipt> {
        let text = extract_from_url(url)?;
        let doc_id = self.store.create(url, &text)?;
        info!(doc_id, url, chars = text.len(), "url ingested");
        Ok(IngestReceipt {
            doc_id,
            title: url.to_string(),
            chars: text.len(),
        })
    }

    pub fn summarize(&self, doc_id: &str, target_words: usize) -> Result<String> {
        let doc = self.require(doc_id)?;
        let summary = self.generator.summarize(&doc.text, target_words);
        self.store
            .set_meta(doc_id, "last_summary", MetaValue::from(summary.clone()))?;
        Ok(summary)
    }

    pub fn chat(&self, doc_id: &str, question: &str) -> Result<String> {
        let doc = self.require(doc_id)?;
        Ok(self.generator.answer(&doc.text, question))
    }

    pub fn flashcards(&self, doc_id: &str, num: usize) -> Result<Vec<Flashcard>> {
        let doc = self.require(doc_id)?;
        Ok(flashcards(&doc.text, num))
    }

    pub fn translate_text(&self, text: &str, target_lang: &str) -> Result<String> {
        Ok(self.generator.translate(text, target_lang))
    }

    pub fn translate_doc(&self, doc_id: &str, target_lang: &str) -> Result<String> {
        let doc = self.require(doc_id)?;
        Ok(self.generator.translate(&doc.text, target_lang))
    }

    pub fn share(&self, doc_id: &str, target_words: usize) -> Result<ShareArtifact> {
        share(
            &self.store,
            &self.generator,
            doc_id,
            target_words,
            &self.share_dir,
        )
    }

    pub fn list_docs(&self) -> Result<BTreeMap<String, DocListing>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|(id, doc)| {
                (
                    id,
                    DocListing {
                        title: doc.title,
                        chars: doc.text.len(),
                    },
                )
            })
            .collect())
    }

    fn require(&self, doc_id: &str) -> Result<docchat_core::Document> {
        self.store
            .get(doc_id)?
            .ok_or_else(|| DocChatError::NotFound(doc_id.to_string()))
    }
}
