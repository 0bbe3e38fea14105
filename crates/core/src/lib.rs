mod chunk;
mod error;
mod normalize;
mod store;
mod text;
mod web;

pub use chunk::{chunk, retrieve, ChunkConfig};
pub use error::{DocChatError, Result};
pub use normalize::normalize;
pub use store::{Document, DocumentStore, MetaValue};
pub use text::clean_text;
pub use web::{extract_from_html, extract_from_url};
