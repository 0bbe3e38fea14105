//! Generation facade: every intent tries the remote model first and falls
//! back to a deterministic local heuristic, so the pipeline produces
//! usable output with no network access at all.

use docchat_core::{chunk, retrieve, ChunkConfig};
use docchat_llm::LlmClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const TOP_K_CHUNKS: usize = 3;
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";
const HEURISTIC_CONTEXT_CHARS: usize = 1200;
const CARD_QUESTION_CHARS: usize = 80;
const CARD_MIN_WORDS: usize = 3;

pub struct Generator {
    llm: Option<LlmClient>,
    chunking: ChunkConfig,
}

enum GenFailure {
    NotConfigured,
    Remote(anyhow::Error),
}

impl Generator {
    /// Remote generation is enabled iff a credential is present in the
    /// environment; otherwise every intent resolves locally.
    pub fn from_env() -> Self {
        Self {
            llm: LlmClient::from_env(),
            chunking: ChunkConfig::default(),
        }
    }

    /// A generator with no remote path, for offline use and tests.
    pub fn offline() -> Self {
        Self {
            llm: None,
            chunking: ChunkConfig::default(),
        }
    }

    pub fn summarize(&self, text: &str, target_words: usize) -> String {
        let prompt = format!(
            "Summarize the following text in about {target_words} words, \
             using crisp bullets if helpful:\n\n{text}"
        );
        self.resolve(&prompt, || heuristic_summary(text, target_words))
    }

    pub fn answer(&self, text: &str, question: &str) -> String {
        let chunks = chunk(text, &self.chunking);
        let context = retrieve(&chunks, question, TOP_K_CHUNKS).join(CONTEXT_SEPARATOR);
        let prompt = format!(
            "Use ONLY the provided context to answer.\n\n\
             Context:\n{context}\n\nQuestion: {question}\nAnswer:"
        );
        self.resolve(&prompt, || {
            let snippet: String = context.chars().take(HEURISTIC_CONTEXT_CHARS).collect();
            format!("(Heuristic answer)\nTop context:\n{snippet}\n\nQ: {question}\n")
        })
    }

    /// Translation has no offline approximation: the fallback labels the
    /// result as unavailable and carries the input through unchanged.
    pub fn translate(&self, text: &str, target_lang: &str) -> String {
        let prompt = format!("Translate to {target_lang}:\n\n{text}");
        self.resolve(&prompt, || {
            format!("[{target_lang} translation unavailable offline]\n{text}")
        })
    }

    /// Two-stage policy: remote attempt, then the unconditional local
    /// fallback. Remote failures are observed here and never propagate.
    fn resolve(&self, prompt: &str, fallback: impl FnOnce() -> String) -> String {
        match self.try_remote(prompt) {
            Ok(output) => output,
            Err(GenFailure::NotConfigured) => {
                debug!("remote generation not configured, using heuristic");
                fallback()
            }
            Err(GenFailure::Remote(err)) => {
                warn!(error = %err, "remote generation failed, using heuristic");
                fallback()
            }
        }
    }

    fn try_remote(&self, prompt: &str) -> Result<String, GenFailure> {
        let client = self.llm.as_ref().ok_or(GenFailure::NotConfigured)?;
        client.complete_blocking(prompt).map_err(GenFailure::Remote)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
}

/// Greedy sentence-budget summarizer: keeps whole sentences until the next
/// one would exceed `target_words`, always keeping at least one.
pub fn heuristic_summary(text: &str, target_words: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }
    let mut kept: Vec<&str> = Vec::new();
    let mut count = 0usize;
    for sentence in &sentences {
        let words = sentence.split_whitespace().count();
        if count + words > target_words && !kept.is_empty() {
            break;
        }
        kept.push(sentence.as_str());
        count += words;
    }
    if kept.is_empty() {
        kept = sentences.iter().take(3).map(String::as_str).collect();
    }
    kept.join(" ")
}

/// Deterministic flashcard extraction; there is no remote path for this
/// intent. Lines with at least three words ending in terminal punctuation
/// become direct cards; remaining lines pad out the requested count as
/// generic "Key point" cards. May return fewer than `num`.
pub fn flashcards(text: &str, num: usize) -> Vec<Flashcard> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let mut cards = Vec::new();
    let mut used = vec![false; lines.len()];
    for (idx, line) in lines.iter().enumerate() {
        if cards.len() >= num {
            break;
        }
        if line.split_whitespace().count() >= CARD_MIN_WORDS
            && line.ends_with(['.', ':', '\u{2014}', '-'])
        {
            let lead: String = line.chars().take(CARD_QUESTION_CHARS).collect();
            cards.push(Flashcard {
                question: format!("What does this refer to: '{lead}'?"),
                answer: line.to_string(),
            });
            used[idx] = true;
        }
    }
    for (idx, line) in lines.iter().enumerate() {
        if cards.len() >= num {
            break;
        }
        if used[idx] {
            continue;
        }
        cards.push(Flashcard {
            question: format!("Key point {}?", cards.len() + 1),
            answer: line.to_string(),
        });
    }
    cards
}

/// Splits on sentence-terminal punctuation followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.trim().chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
