use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tillscan_email::Mailer;
use tillscan_ocr::{OcrBackend, ReceiptPipeline, StorageLocation};
use tillscan_storage::{get_receipt_by_id, insert_receipt, DbPool, StorageError, StoredReceipt};

use crate::util::unquote_plus;

pub struct AppState {
    pub db: DbPool,
    pub pipeline: ReceiptPipeline<Box<dyn OcrBackend>>,
    pub mailer: Option<Mailer>,
}

/// One inbound trigger event per stored document.
#[derive(Debug, Deserialize)]
pub struct EventRecord {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct EventBatch {
    pub records: Vec<EventRecord>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(handle_events))
        .route("/receipts/{id}", get(get_receipt))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Batch trigger surface. Documents are processed in order; the first
/// storage failure fails the whole batch with a 500 embedding the error
/// text. Records stored before the failure stay stored.
async fn handle_events(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<EventBatch>,
) -> (StatusCode, Json<Value>) {
    match process_batch(&state, batch).await {
        Ok(processed) => (
            StatusCode::OK,
            Json(json!({
                "message": "Receipt processing completed successfully",
                "processed": processed,
            })),
        ),
        Err(e) => {
            tracing::error!("Error processing receipt batch: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": format!("Error: {e}") })),
            )
        }
    }
}

async fn process_batch(state: &AppState, batch: EventBatch) -> Result<usize, StorageError> {
    let mut processed = 0;
    for event in batch.records {
        let location = StorageLocation::new(event.bucket, unquote_plus(&event.key));
        let receipt_id = Uuid::new_v4().to_string();
        let stored_at = Utc::now().to_rfc3339();

        let extraction = state.pipeline.process(&location);
        let record = extraction.record();

        insert_receipt(
            &state.db,
            &receipt_id,
            &stored_at,
            &location.object_url(),
            extraction.status(),
            record,
        )
        .await?;
        tracing::info!(
            receipt_id = %receipt_id,
            status = extraction.status(),
            "Stored receipt from {}",
            location.object_url()
        );

        // Notification is best-effort and never fails the batch.
        if let Some(mailer) = &state.mailer {
            if let Err(e) = mailer.send_receipt_summary(&receipt_id, record).await {
                tracing::warn!("Notification failed for receipt {receipt_id}: {e}");
            }
        }

        processed += 1;
    }
    Ok(processed)
}

async fn get_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredReceipt>, StatusCode> {
    match get_receipt_by_id(&state.db, &id).await {
        Ok(Some(receipt)) => Ok(Json(receipt)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Receipt lookup failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
