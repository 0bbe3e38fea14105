mod config;
mod facade;
mod ops;
mod share;

pub use config::Settings;
pub use facade::{flashcards, heuristic_summary, Flashcard, Generator};
pub use ops::{DocChat, DocListing, IngestReceipt};
pub use share::{share, ShareArtifact};
pub use docchat_core::{DocChatError, Result};
