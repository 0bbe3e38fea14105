//! Line-oriented stdio front-end. One JSON object per input line
//! (`{"tool": "...", "args": {...}}`), one JSON object per output line
//! (`{"ok": true, "result": ...}` or `{"ok": false, "error": "..."}`).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::{json, Value};

use docchat_pipeline::{DocChat, Settings};

#[derive(Parser, Debug)]
#[command(name = "docchat", about = "docchat stdio command reader")]
struct Cli {
    /// Path of the JSON document store blob.
    #[arg(long)]
    store: Option<PathBuf>,
    /// Directory share artifacts are written to.
    #[arg(long)]
    share_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut settings = Settings::from_env();
    if let Some(store) = cli.store {
        settings.db_path = store;
    }
    if let Some(share_dir) = cli.share_dir {
        settings.share_dir = share_dir;
    }
    let pipeline = DocChat::from_settings(&settings);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match handle_line(&pipeline, line) {
            Ok(result) => json!({ "ok": true, "result": result }),
            Err(err) => json!({ "ok": false, "error": err.to_string() }),
        };
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_line(pipeline: &DocChat, line: &str) -> Result<Value> {
    let request: Value = serde_json::from_str(line)?;
    let tool = request
        .get("tool")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing tool name"))?;
    let default_args = json!({});
    let args = request.get("args").unwrap_or(&default_args);
    dispatch(pipeline, tool, args)
}

fn dispatch(pipeline: &DocChat, tool: &str, args: &Value) -> Result<Value> {
    match tool {
        "ingest_text" => {
            let title = str_arg(args, "title").unwrap_or("Untitled");
            let text = str_arg(args, "text").unwrap_or("");
            let receipt = pipeline.ingest_text(title, text)?;
            Ok(json!({ "doc_id": receipt.doc_id, "title": receipt.title }))
        }
        "ingest_file" => {
            let path = require_str(args, "path")?;
            let data = fs::read(path)?;
            let receipt = pipeline.ingest_file(path, &data, str_arg(args, "title"))?;
            Ok(json!({
                "doc_id": receipt.doc_id,
                "title": receipt.title,
                "chars": receipt.chars,
            }))
        }
        "ingest_url" => {
            let url = require_str(args, "url")?;
            let receipt = pipeline.ingest_url(url)?;
            Ok(json!({ "doc_id": receipt.doc_id, "title": receipt.title }))
        }
        "summarize_doc" => {
            let doc_id = require_str(args, "doc_id")?;
            let target_words = usize_arg(args, "target_words").unwrap_or(150);
            let summary = pipeline.summarize(doc_id, target_words)?;
            Ok(Value::String(summary))
        }
        "chat_with_doc" => {
            let doc_id = require_str(args, "doc_id")?;
            let question = require_str(args, "question")?;
            let answer = pipeline.chat(doc_id, question)?;
            Ok(Value::String(answer))
        }
        "generate_flashcards" => {
            let doc_id = require_str(args, "doc_id")?;
            let num = usize_arg(args, "num").unwrap_or(10);
            let cards = pipeline.flashcards(doc_id, num)?;
            Ok(serde_json::to_value(cards)?)
        }
        "translate_text" => {
            let text = require_str(args, "text")?;
            let target_lang = str_arg(args, "target_lang").unwrap_or("hi");
            Ok(Value::String(pipeline.translate_text(text, target_lang)?))
        }
        "translate_doc" => {
            let doc_id = require_str(args, "doc_id")?;
            let target_lang = str_arg(args, "target_lang").unwrap_or("hi");
            Ok(Value::String(pipeline.translate_doc(doc_id, target_lang)?))
        }
        "share_summary_link" => {
            let doc_id = require_str(args, "doc_id")?;
            let target_words = usize_arg(args, "target_words").unwrap_or(150);
            let artifact = pipeline.share(doc_id, target_words)?;
            Ok(json!({
                "token": artifact.token,
                "path": artifact.path.display().to_string(),
            }))
        }
        "list_docs" => Ok(serde_json::to_value(pipeline.list_docs()?)?),
        other => Err(anyhow!("unknown tool: {other}")),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    str_arg(args, key).ok_or_else(|| anyhow!("missing argument: {key}"))
}

fn usize_arg(args: &Value, key: &str) -> Option<usize> {
    args.get(key).and_then(Value::as_u64).map(|n| n as usize)
}
