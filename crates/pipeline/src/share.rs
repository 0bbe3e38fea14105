use std::fs;
use std::path::{Path, PathBuf};

use docchat_core::{DocChatError, DocumentStore, MetaValue, Result};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::facade::Generator;

const TOKEN_LEN: usize = 10;
const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A rendered summary addressable by its token-named file. Artifacts are
/// never expired or cleaned up here; removal is external.
#[derive(Debug, Clone, Serialize)]
pub struct ShareArtifact {
    pub token: String,
    pub path: PathBuf,
}

/// Materializes a summary of the document as `<out_dir>/<token>.md` and
/// records the token in the document's metadata.
///
/// The file layout is a contract external consumers rely on: a
/// `# Summary for: <title>` header line, a blank line, then the summary.
/// Tokens are random and unchecked for collisions.
pub fn share(
    store: &DocumentStore,
    generator: &Generator,
    doc_id: &str,
    target_words: usize,
    out_dir: &Path,
) -> Result<ShareArtifact> {
    let doc = store
        .get(doc_id)?
        .ok_or_else(|| DocChatError::NotFound(doc_id.to_string()))?;
    let summary = generator.summarize(&doc.text, target_words);
    fs::create_dir_all(out_dir)?;
    let token = random_token(TOKEN_LEN);
    let path = out_dir.join(format!("{token}.md"));
    fs::write(&path, format!("# Summary for: {}\n\n{summary}\n", doc.title))?;
    store.set_meta(doc_id, "share_token", MetaValue::from(token.clone()))?;
    info!(doc_id, token = %token, path = %path.display(), "share artifact written");
    Ok(ShareArtifact { token, path })
}

fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TOKEN_CHARS[rng.gen_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tokens_are_lowercase_alphanumeric_of_fixed_length() {
        let token = random_token(TOKEN_LEN);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn share_writes_the_exact_file_layout() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("doc_store.json"));
        let id = store
            .create("Launch Notes", "Ship it today. Fix bugs tomorrow.")
            .unwrap();
        let out_dir = dir.path().join("shares");

        let artifact = share(&store, &Generator::offline(), &id, 150, &out_dir).unwrap();

        let contents = fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(
            contents,
            "# Summary for: Launch Notes\n\nShip it today. Fix bugs tomorrow.\n"
        );
        let doc = store.get(&id).unwrap().unwrap();
        assert_eq!(
            doc.meta.get("share_token"),
            Some(&MetaValue::from(artifact.token.clone()))
        );
        assert_eq!(artifact.path, out_dir.join(format!("{}.md", artifact.token)));
    }

    #[test]
    fn share_on_missing_document_is_not_found() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("doc_store.json"));
        let err = share(&store, &Generator::offline(), "nope", 150, dir.path()).unwrap_err();
        assert!(matches!(err, DocChatError::NotFound(_)));
    }
}
