use std::env;
use std::path::PathBuf;

/// Environment-driven settings shared by both front-ends. The remote
/// generation credentials (`OPENAI_API_KEY` and friends) are read by the
/// llm crate itself.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub share_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let db_path = env::var("DOCCHAT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("doc_store.json"));
        let share_dir = env::var("DOCCHAT_SHARE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("shares"));
        Self { db_path, share_dir }
    }
}
