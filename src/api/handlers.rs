//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::excel::SheetLoader;
use crate::ingest;
use crate::ledger::{persist_batch, PersistSummary, StockStore, StoredStock};
use crate::types::{IngestSummary, RawRow, StockRecord};

use super::server::AppState;

/// Header naming the user an upload is recorded against
pub const UPLOADED_BY_HEADER: &str = "x-uploaded-by";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a failed request: ingest errors are 400, the rest 500
pub fn error_status(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::Ingest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Stockledger API Server".to_string(),
        version: state.version.clone(),
        description: "Stock sheet ingestion for the inventory dashboard".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/validate", "POST", "Validate a stock sheet on disk"),
            endpoint("/api/v1/ingest", "POST", "Parse a stock sheet on disk"),
            endpoint(
                "/api/v1/upload",
                "POST",
                "Upload a stock sheet (request body) and book it against accounts",
            ),
            endpoint(
                "/api/v1/parties/:party_id/stocks",
                "GET",
                "List stored stock for an account, newest first",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "validate".to_string(),
            "ingest".to_string(),
            "upload".to_string(),
            "stocks".to_string(),
        ],
    }))
}

/// Validate request
#[derive(Deserialize)]
pub struct ValidateRequest {
    pub file_path: String,
}

/// Validate response
#[derive(Serialize, Default)]
pub struct ValidateResponse {
    pub valid: bool,
    pub file_path: String,
    pub record_count: usize,
    pub message: String,
}

/// Load the first sheet and enforce the configured row limit.
///
/// Unreadable workbooks are 400; a grid over `max_rows` is 413 and never
/// reaches the engine.
fn load_rows(state: &AppState, loader: SheetLoader) -> Result<Vec<RawRow>, (StatusCode, String)> {
    let rows = loader.load().map_err(|e| {
        warn!(error = %e, "sheet rejected: unreadable workbook");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    if let Some(max_rows) = state.max_rows {
        if rows.len() > max_rows {
            warn!(rows = rows.len(), max_rows, "sheet rejected: too many rows");
            return Err((
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Sheet has {} rows, limit is {}", rows.len(), max_rows),
            ));
        }
    }

    Ok(rows)
}

/// POST /api/v1/validate - Validate a stock sheet
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> (StatusCode, Json<ApiResponse<ValidateResponse>>) {
    let result = match load_rows(&state, SheetLoader::from_path(&req.file_path)) {
        Ok(rows) => ingest::ingest_rows(rows).map_err(|e| e.to_string()),
        Err((status, message)) if status == StatusCode::PAYLOAD_TOO_LARGE => {
            return (status, Json(ApiResponse::err(message)));
        }
        Err((_, message)) => Err(message),
    };

    let response = match result {
        Ok(records) => ValidateResponse {
            valid: true,
            file_path: req.file_path,
            record_count: records.len(),
            message: "Validation successful".to_string(),
        },
        Err(message) => ValidateResponse {
            valid: false,
            file_path: req.file_path,
            record_count: 0,
            message,
        },
    };
    (StatusCode::OK, Json(ApiResponse::ok(response)))
}

/// Ingest request
#[derive(Deserialize)]
pub struct IngestRequest {
    pub file_path: String,
}

/// Ingest response
#[derive(Serialize, Default)]
pub struct IngestResponse {
    pub file_path: String,
    pub summary: IngestSummary,
    pub records: Vec<StockRecord>,
}

/// POST /api/v1/ingest - Parse a stock sheet into records
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> (StatusCode, Json<ApiResponse<IngestResponse>>) {
    let rows = match load_rows(&state, SheetLoader::from_path(&req.file_path)) {
        Ok(rows) => rows,
        Err((status, message)) => return (status, Json(ApiResponse::err(message))),
    };

    match ingest::ingest_rows(rows) {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::ok(IngestResponse {
                file_path: req.file_path,
                summary: IngestSummary::from_records(&records),
                records,
            })),
        ),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

/// Upload response
#[derive(Serialize, Default)]
pub struct UploadResponse {
    pub record_count: usize,
    pub stored: usize,
    pub dropped: usize,
    pub message: String,
}

impl UploadResponse {
    fn from_summary(record_count: usize, summary: PersistSummary) -> Self {
        Self {
            record_count,
            stored: summary.stored,
            dropped: summary.dropped,
            message: format!("Stocks uploaded successfully! ({} stored)", summary.stored),
        }
    }
}

fn persist_rows(
    state: &AppState,
    rows: Vec<RawRow>,
    uploaded_by: Option<&str>,
) -> LedgerResult<UploadResponse> {
    let records = ingest::ingest_rows(rows)?;
    let record_count = records.len();
    let ledger = state.ledger.as_ref();
    let summary = persist_batch(records, ledger, ledger, uploaded_by)?;
    Ok(UploadResponse::from_summary(record_count, summary))
}

/// POST /api/v1/upload - Ingest a workbook from the request body and store it
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<UploadResponse>>) {
    let uploaded_by = headers
        .get(UPLOADED_BY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let rows = match load_rows(&state, SheetLoader::from_bytes(body.to_vec())) {
        Ok(rows) => rows,
        Err((status, message)) => return (status, Json(ApiResponse::err(message))),
    };

    match persist_rows(&state, rows, uploaded_by) {
        Ok(response) => (StatusCode::CREATED, Json(ApiResponse::ok(response))),
        Err(e) => {
            warn!(error = %e, "upload failed");
            (error_status(&e), Json(ApiResponse::err(e.to_string())))
        }
    }
}

/// Party stock listing response
#[derive(Serialize, Default)]
pub struct PartyStocksResponse {
    pub party_id: String,
    pub count: usize,
    pub stocks: Vec<StoredStock>,
}

/// GET /api/v1/parties/:party_id/stocks - Stored stock for one account
pub async fn party_stocks(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<PartyStocksResponse>>) {
    match state.ledger.by_party(&party_id) {
        Ok(stocks) => (
            StatusCode::OK,
            Json(ApiResponse::ok(PartyStocksResponse {
                party_id,
                count: stocks.len(),
                stocks,
            })),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::err(e.to_string()))),
    }
}
