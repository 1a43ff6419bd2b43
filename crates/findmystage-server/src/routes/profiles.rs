//! Speaker profile routes: /api/profiles/*.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use findmystage_core::Error;
use findmystage_ingest::{DocumentBlob, MediaType, ProfileInput, ReferenceChannel};
use tracing::{debug, info};

use super::error_response;
use crate::state::AppState;

/// Upper bound on an analyze request body.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Multipart field carrying the PDF.
const DOCUMENT_FIELD: &str = "document";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/profiles/analyze",
            post(analyze).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/profiles/current", get(current))
}

/// POST /api/profiles/analyze: run one analysis and return its report.
async fn analyze(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let input = match read_input(multipart).await {
        Ok(input) => input,
        Err(e) => return error_response(&e).into_response(),
    };

    let analyzer = state.analyzer();
    match analyzer.run(&state.board, input).await {
        Ok(report) => {
            info!(
                "Request {} finished: applied={} notice={:?}",
                report.request_id, report.applied, report.notice.title
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}

/// GET /api/profiles/current: the displayed profile, if any.
async fn current(State(state): State<Arc<AppState>>) -> Response {
    match state.board.current() {
        Some(profile) => Json(profile).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "No profile has been analyzed yet" })),
        )
            .into_response(),
    }
}

async fn read_input(mut multipart: Multipart) -> findmystage_core::Result<ProfileInput> {
    let mut input = ProfileInput::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == DOCUMENT_FIELD {
            let filename = field.file_name().map(|n| n.to_string());
            let mime = declared_mime(field.content_type(), filename.as_deref());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::InvalidInput(format!("Failed to read document: {}", e)))?;
            if bytes.is_empty() {
                debug!("Ignoring empty document field");
                continue;
            }
            input = input.with_document(DocumentBlob::new(bytes.to_vec(), &mime, filename)?);
            continue;
        }

        match ReferenceChannel::from_form_field(&name) {
            Some(channel) => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidInput(format!("Failed to read {}: {}", name, e)))?;
                input = input.with_link(channel, url);
            }
            None => debug!("Ignoring unknown form field '{}'", name),
        }
    }

    Ok(input)
}

/// Declared content type, or one inferred from the filename when the client
/// sent none.
fn declared_mime(content_type: Option<&str>, filename: Option<&str>) -> String {
    if let Some(ct) = content_type.filter(|ct| !ct.is_empty()) {
        return ct.to_string();
    }
    let ext = filename
        .and_then(|f| std::path::Path::new(f).extension())
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match MediaType::from_extension(ext) {
        MediaType::Pdf => MediaType::PDF_MIME.to_string(),
        MediaType::Unsupported => "application/octet-stream".to_string(),
    }
}
