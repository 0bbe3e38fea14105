use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

static TERMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("regex"));

#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    pub chunk_words: usize,
    pub overlap_words: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_words: 1000,
            overlap_words: 150,
        }
    }
}

/// Splits `text` into overlapping word windows of `chunk_words` words,
/// advancing by `max(1, chunk_words - overlap_words)` each step. When the
/// overlap is at least the window size the step degrades to a single word.
///
/// The loop stops as soon as a window covers the final word, so a text of
/// at most `chunk_words` words yields exactly one chunk and every word
/// appears in at least one window.
pub fn chunk(text: &str, config: &ChunkConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let size = config.chunk_words.max(1);
    let step = config.chunk_words.saturating_sub(config.overlap_words).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Scores every chunk against `question` by raw term overlap: the question
/// is tokenized into a case-insensitive set of alphanumeric terms, and a
/// chunk scores the sum of each term's occurrence count within it.
///
/// Returns the `top_k` positive-scoring chunks in descending score order
/// (ties keep original chunk order). When nothing scores, the first chunk
/// is returned alone so question answering always has some context. An
/// empty chunk list yields an empty result.
pub fn retrieve(chunks: &[String], question: &str, top_k: usize) -> Vec<String> {
    let Some(first) = chunks.first() else {
        return Vec::new();
    };
    let query_terms: FxHashSet<String> = TERMS
        .find_iter(question)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    let mut scored: Vec<(usize, &String)> = chunks
        .iter()
        .map(|chunk| {
            let mut counts: FxHashMap<String, usize> = FxHashMap::default();
            for term in TERMS.find_iter(chunk) {
                *counts.entry(term.as_str().to_lowercase()).or_default() += 1;
            }
            let score = query_terms
                .iter()
                .map(|term| counts.get(term).copied().unwrap_or(0))
                .sum();
            (score, chunk)
        })
        .collect();
    scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));
    let hits: Vec<String> = scored
        .into_iter()
        .take(top_k)
        .filter(|(score, _)| *score > 0)
        .map(|(_, chunk)| chunk.clone())
        .collect();
    if hits.is_empty() {
        vec![first.clone()]
    } else {
        hits
    }
}
