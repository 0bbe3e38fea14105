//! HTTP front-end: request parsing and response framing only. All
//! document intelligence lives in `docchat_pipeline`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task;
use tracing::info;

use docchat_core::DocChatError;
use docchat_pipeline::{DocChat, DocListing, Flashcard, Settings};

struct AppState {
    pipeline: DocChat,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let settings = Settings::from_env();
    let state = Arc::new(AppState {
        pipeline: DocChat::from_settings(&settings),
    });
    let app = Router::new()
        .route("/ingest_text", post(handle_ingest_text))
        .route("/ingest_file", post(handle_ingest_file))
        .route("/ingest_url", post(handle_ingest_url))
        .route("/summarize_doc", post(handle_summarize))
        .route("/chat_with_doc", post(handle_chat))
        .route("/generate_flashcards", post(handle_flashcards))
        .route("/translate_text", post(handle_translate_text))
        .route("/translate_doc", post(handle_translate_doc))
        .route("/share_summary_link", post(handle_share))
        .route("/list_docs", get(handle_list))
        .with_state(state);
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngestTextRequest {
    title: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct IngestUrlRequest {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    doc_id: String,
    #[serde(default = "default_target_words")]
    target_words: usize,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    doc_id: String,
    question: String,
}

#[derive(Debug, Deserialize)]
struct FlashcardsRequest {
    doc_id: String,
    #[serde(default = "default_card_count")]
    num: usize,
}

#[derive(Debug, Deserialize)]
struct TranslateTextRequest {
    text: String,
    #[serde(default = "default_target_lang")]
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateDocRequest {
    doc_id: String,
    #[serde(default = "default_target_lang")]
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct ShareRequest {
    doc_id: String,
    #[serde(default = "default_target_words")]
    target_words: usize,
}

fn default_target_words() -> usize {
    150
}

fn default_card_count() -> usize {
    10
}

fn default_target_lang() -> String {
    "hi".to_string()
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    doc_id: String,
    title: String,
    chars: usize,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct FlashcardsResponse {
    cards: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
struct TranslationResponse {
    translation: String,
}

#[derive(Debug, Serialize)]
struct ShareResponse {
    token: String,
    path: String,
}

async fn handle_ingest_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestTextRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let receipt = run_blocking(state, move |pipeline| {
        pipeline.ingest_text(&body.title, &body.text)
    })
    .await?;
    Ok(Json(IngestResponse {
        doc_id: receipt.doc_id,
        title: receipt.title,
        chars: receipt.chars,
    }))
}

async fn handle_ingest_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let upload = extract_upload(&mut multipart).await?;
    let receipt = run_blocking(state, move |pipeline| {
        pipeline.ingest_file(&upload.filename, &upload.data, upload.title.as_deref())
    })
    .await?;
    Ok(Json(IngestResponse {
        doc_id: receipt.doc_id,
        title: receipt.title,
        chars: receipt.chars,
    }))
}

async fn handle_ingest_url(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestUrlRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let receipt = run_blocking(state, move |pipeline| pipeline.ingest_url(&body.url)).await?;
    Ok(Json(IngestResponse {
        doc_id: receipt.doc_id,
        title: receipt.title,
        chars: receipt.chars,
    }))
}

async fn handle_summarize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = run_blocking(state, move |pipeline| {
        pipeline.summarize(&body.doc_id, body.target_words)
    })
    .await?;
    Ok(Json(SummaryResponse { summary }))
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = run_blocking(state, move |pipeline| {
        pipeline.chat(&body.doc_id, &body.question)
    })
    .await?;
    Ok(Json(AnswerResponse { answer }))
}

async fn handle_flashcards(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FlashcardsRequest>,
) -> Result<Json<FlashcardsResponse>, AppError> {
    let cards = run_blocking(state, move |pipeline| {
        pipeline.flashcards(&body.doc_id, body.num)
    })
    .await?;
    Ok(Json(FlashcardsResponse { cards }))
}

async fn handle_translate_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateTextRequest>,
) -> Result<Json<TranslationResponse>, AppError> {
    let translation = run_blocking(state, move |pipeline| {
        pipeline.translate_text(&body.text, &body.target_lang)
    })
    .await?;
    Ok(Json(TranslationResponse { translation }))
}

async fn handle_translate_doc(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateDocRequest>,
) -> Result<Json<TranslationResponse>, AppError> {
    let translation = run_blocking(state, move |pipeline| {
        pipeline.translate_doc(&body.doc_id, &body.target_lang)
    })
    .await?;
    Ok(Json(TranslationResponse { translation }))
}

async fn handle_share(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    let artifact = run_blocking(state, move |pipeline| {
        pipeline.share(&body.doc_id, body.target_words)
    })
    .await?;
    Ok(Json(ShareResponse {
        token: artifact.token,
        path: artifact.path.display().to_string(),
    }))
}

async fn handle_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, DocListing>>, AppError> {
    let listing = run_blocking(state, |pipeline| pipeline.list_docs()).await?;
    Ok(Json(listing))
}

/// The pipeline is synchronous (blocking file and network I/O); every
/// handler hops onto the blocking pool for the duration of the call.
async fn run_blocking<T, F>(state: Arc<AppState>, op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&DocChat) -> docchat_core::Result<T> + Send + 'static,
{
    task::spawn_blocking(move || op(&state.pipeline))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::from)
}

struct Upload {
    filename: String,
    data: Vec<u8>,
    title: Option<String>,
}

async fn extract_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut title = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                upload = Some((filename, data.to_vec()));
            }
            Some("title") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                if !value.trim().is_empty() {
                    title = Some(value);
                }
            }
            _ => {}
        }
    }
    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;
    Ok(Upload {
        filename,
        data,
        title,
    })
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Pipeline(#[from] DocChatError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn internal(err: impl ToString) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Pipeline(DocChatError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Pipeline(
                DocChatError::Fetch(_)
                | DocChatError::Extraction(_)
                | DocChatError::InvalidInput(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
