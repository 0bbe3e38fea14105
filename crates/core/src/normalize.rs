use std::path::Path;

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

use crate::error::{DocChatError, Result};
use crate::text::clean_text;

const WORD_MIMES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "rtf"];

/// Bare PDF output shorter than this (non-whitespace) is treated as a
/// failed best-effort attempt on an unknown format.
const MIN_USEFUL_CHARS: usize = 20;

/// Derives a title from the filename and extracts plain text from `data`,
/// dispatching on sniffed content first and the file extension second.
///
/// Uploads are frequently mislabeled, so an unknown format gets a
/// best-effort pass through the PDF extractor before falling back to
/// permissive text decoding.
pub fn normalize(filename: &str, data: &[u8]) -> Result<(String, String)> {
    let name = Path::new(filename);
    let title = name
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Untitled")
        .to_string();
    let ext = name
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    let mime = infer::get(data)
        .map(|kind| kind.mime_type())
        .unwrap_or_default();
    debug!(filename, mime, ext = %ext, "normalizing upload");

    if mime == "application/pdf" || ext == "pdf" {
        return Ok((title, from_pdf_bytes(data)?));
    }
    if WORD_MIMES.contains(&mime) || ext == "docx" {
        return Ok((title, from_docx_bytes(data)?));
    }
    if mime.starts_with("text/") || TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Ok((title, from_text_bytes(data)));
    }

    // Undetected format: try PDF, keep it only if it produced real text.
    if let Ok(text) = from_pdf_bytes(data) {
        if text.chars().filter(|c| !c.is_whitespace()).count() >= MIN_USEFUL_CHARS {
            return Ok((title, text));
        }
    }
    Ok((title, from_text_bytes(data)))
}

fn from_pdf_bytes(data: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|err| DocChatError::Extraction(format!("pdf extraction failed: {err}")))?;
    Ok(clean_text(&text))
}

fn from_docx_bytes(data: &[u8]) -> Result<String> {
    let docx = read_docx(data)
        .map_err(|err| DocChatError::Extraction(format!("docx extraction failed: {err}")))?;
    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for child in paragraph.children {
                if let ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let RunChild::Text(text) = child {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            if !line.trim().is_empty() {
                paragraphs.push(line);
            }
        }
    }
    Ok(clean_text(&paragraphs.join("\n")))
}

/// Decodes bytes as text, trying UTF-8, then UTF-16, then permissive
/// Windows-1252 with invalid characters discarded. Never fails; worst
/// case is an empty string.
fn from_text_bytes(data: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(data) {
        return clean_text(text);
    }
    if let Some(text) = encoding_rs::UTF_16LE.decode_without_bom_handling_and_without_replacement(data)
    {
        return clean_text(&text);
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(data);
    clean_text(&text)
}
