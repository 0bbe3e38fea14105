use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{DocChatError, Result};
use crate::text::clean_text;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0";

/// Node kinds that never carry main content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "iframe", "aside", "form", "input",
    "button", "svg",
];

/// Likely main-content containers, scanned in order; the longest extracted
/// text across all of them wins, not the first match.
const CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".article",
    ".post",
    ".entry-content",
    ".content",
];

/// Candidates shorter than this are discarded for a whole-body scrape.
const MIN_CANDIDATE_CHARS: usize = 300;
const MIN_BLOCK_WORDS: usize = 3;

static CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    CANDIDATE_SELECTORS
        .iter()
        .map(|sel| Selector::parse(sel).expect("selector"))
        .collect()
});
static BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, h1, h2, h3, li").expect("selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("selector"));

/// Fetches `url` and extracts its main text content. A non-success HTTP
/// status is a hard `Fetch` failure; parsing never fails.
pub fn extract_from_url(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| DocChatError::Fetch(err.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|err| DocChatError::Fetch(format!("request to {url} failed: {err}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(DocChatError::Fetch(format!(
            "{url} returned status {status}"
        )));
    }
    let html = response
        .text()
        .map_err(|err| DocChatError::Fetch(format!("reading body of {url} failed: {err}")))?;
    debug!(url, bytes = html.len(), "fetched page");
    Ok(extract_from_html(&html))
}

/// The fetch-free half of [`extract_from_url`]: ranks candidate content
/// containers by extracted text length and falls back to a document-wide
/// paragraph scrape when the best candidate is too short.
pub fn extract_from_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    let mut best = String::new();
    for selector in CANDIDATES.iter() {
        for node in doc.select(selector) {
            if in_noise(node) {
                continue;
            }
            let text = collect_blocks(node);
            if text.chars().count() > best.chars().count() {
                best = text;
            }
        }
    }

    if best.chars().count() < MIN_CANDIDATE_CHARS {
        let body_text = doc
            .select(&BODY)
            .next()
            .map(collect_blocks)
            .unwrap_or_default();
        best = if body_text.is_empty() {
            raw_text(&doc)
        } else {
            body_text
        };
    }

    clean_text(&best)
}

/// Joins the text of every paragraph/heading/list-item descendant of
/// `scope` that carries at least [`MIN_BLOCK_WORDS`] words, skipping
/// anything nested inside a noise node.
fn collect_blocks(scope: ElementRef) -> String {
    let mut parts = Vec::new();
    for block in scope.select(&BLOCKS) {
        if in_noise(block) {
            continue;
        }
        let text = visible_text(block);
        if text.split_whitespace().count() >= MIN_BLOCK_WORDS {
            parts.push(text);
        }
    }
    parts.join("\n")
}

/// Text of `element` and its descendants, excluding noise subtrees, with
/// whitespace between segments normalized to single spaces.
fn visible_text(element: ElementRef) -> String {
    let mut segments = Vec::new();
    push_visible_text(element, &mut segments);
    segments
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_visible_text(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(text.text.to_string());
        } else if let Some(el) = ElementRef::wrap(child) {
            if !NOISE_TAGS.contains(&el.value().name()) {
                push_visible_text(el, out);
            }
        }
    }
}

fn in_noise(element: ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| NOISE_TAGS.contains(&el.name()))
    })
}

/// Whole-document text for markup with no usable blocks at all. Noise
/// subtrees stay excluded even on this last-resort path.
fn raw_text(doc: &Html) -> String {
    let mut segments = Vec::new();
    push_visible_text(doc.root_element(), &mut segments);
    segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_candidate_wins_over_first_match() {
        let html = r#"
            <html><body>
              <article><p>short article text here</p></article>
              <div class="content">
                <p>this is a much longer block of content text that should win
                   because candidate ranking keeps the largest extraction, and
                   it keeps going with enough words to comfortably clear the
                   minimum length a candidate needs before the whole-body
                   scrape would take over instead of this container</p>
                <p>with a second qualifying paragraph for good measure, also
                   padded out with some additional words to help the total</p>
              </div>
            </body></html>"#;
        let text = extract_from_html(html);
        assert!(text.contains("much longer block"));
        assert!(!text.starts_with("short article"));
    }

    #[test]
    fn noise_nodes_are_excluded() {
        let html = r#"
            <html><body>
              <article>
                <p>keep this paragraph of real content</p>
                <nav><li>menu item one two three</li></nav>
                <p>also keep <script>var x = "drop this entirely";</script> this one</p>
              </article>
            </body></html>"#;
        let text = extract_from_html(html);
        assert!(text.contains("keep this paragraph"));
        assert!(text.contains("also keep this one"));
        assert!(!text.contains("menu item"));
        assert!(!text.contains("drop this"));
    }

    #[test]
    fn short_candidate_triggers_whole_body_scrape() {
        let filler = "body paragraph with plenty of words repeated over and over again. "
            .repeat(10);
        let html = format!(
            r#"<html><body>
                 <div class="content"><p>tiny content block here</p></div>
                 <p>{filler}</p>
               </body></html>"#
        );
        let text = extract_from_html(&html);
        assert!(text.contains("plenty of words"));
        assert!(text.chars().count() > MIN_CANDIDATE_CHARS);
    }

    #[test]
    fn blocks_under_three_words_are_skipped() {
        let html = r#"
            <html><body><article>
              <p>ok</p>
              <p>this one qualifies fine</p>
            </article></body></html>"#;
        let text = extract_from_html(html);
        assert_eq!(text, "this one qualifies fine");
    }

    #[test]
    fn raw_text_fallback_skips_noise_subtrees() {
        // No block reaches three words, so extraction degrades all the
        // way to the whole-document walk; script content must still be
        // absent there.
        let html = r#"
            <html><body>
              <p>two words</p>
              <script>var hiddenPayload = "never show this";</script>
              <style>p { display: none; }</style>
            </body></html>"#;
        let text = extract_from_html(html);
        assert!(text.contains("two words"));
        assert!(!text.contains("hiddenPayload"));
        assert!(!text.contains("display: none"));
    }

    #[test]
    fn document_without_body_falls_back_to_raw_text() {
        let text = extract_from_html("just bare text, no markup at all");
        assert!(text.contains("just bare text"));
    }
}
