//! HTTP API for the tabex export engine.
//!
//! Routes under `/api/reports` run exports and answer with either
//! `{"fileUrl": ...}` or, when the report couldn't be stored, the CSV itself
//! as `text/csv`. Stored reports are served back from the files prefix.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error};

use tabex_export::{
    BaseUrl, ExportArtifact, ExportError, ExportResult, Exporter, FileSink, RowsExport,
};
use tabex_model::{ExportFilter, ExportSpec, RecordType};
use tabex_store::RecordStore;

/// Body of a successful export whose file was stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FileUrlResponse {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

/// Shared state for all handlers.
pub struct AppState {
    exporter: Exporter,
    reports_dir: PathBuf,
    files_prefix: String,
    public_url: Option<BaseUrl>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, sink: FileSink) -> Self {
        let reports_dir = sink.dir().to_path_buf();
        let files_prefix = sink.prefix().to_string();
        Self {
            exporter: Exporter::new(store, Arc::new(sink)),
            reports_dir,
            files_prefix,
            public_url: None,
        }
    }

    /// Build retrieval URLs on `origin` instead of the request's Host header.
    #[must_use]
    pub fn with_public_url(mut self, origin: &str) -> Self {
        self.public_url = Some(BaseUrl::from_origin(origin));
        self
    }

    /// Swap in a preconfigured exporter, e.g. one with a different sink.
    #[must_use]
    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    fn base_url(&self, headers: &HeaderMap) -> BaseUrl {
        if let Some(url) = &self.public_url {
            return url.clone();
        }
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        BaseUrl::new(scheme, host)
    }
}

/// An [`ExportError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ExportError);

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            error!(error = %self.0, "Export failed");
        }
        let body = ErrorResponse {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn artifact_response(artifact: ExportArtifact) -> Response {
    match artifact {
        ExportArtifact::Stored { url, .. } => Json(FileUrlResponse { file_url: url }).into_response(),
        ExportArtifact::Inline { body, content_type } => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
    }
}

/// Run an export on the blocking pool. A panic becomes an internal error
/// carrying the panic message.
async fn run_blocking<F>(job: F) -> Result<Response, ApiError>
where
    F: FnOnce() -> ExportResult<ExportArtifact> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => Ok(artifact_response(result?)),
        Err(join) => {
            let message = if join.is_panic() {
                let payload = join.into_panic();
                payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "export task panicked".to_string())
            } else {
                join.to_string()
            };
            Err(ApiError(ExportError::Internal(message)))
        }
    }
}

async fn run_spec(state: Arc<AppState>, headers: HeaderMap, spec: ExportSpec) -> Result<Response, ApiError> {
    let base = state.base_url(&headers);
    run_blocking(move || state.exporter.run_export(&spec, &base)).await
}

fn date_range(params: &HashMap<String, String>) -> ExportFilter {
    ExportFilter::from_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))).date_range_only()
}

async fn stock_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let spec = ExportSpec::new(RecordType::Product, date_range(&params));
    run_spec(state, headers, spec).await
}

async fn customers_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let spec = ExportSpec::new(RecordType::User, date_range(&params));
    run_spec(state, headers, spec).await
}

async fn download_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let type_name = params.get("type").map(String::as_str).unwrap_or_default();
    let record_type = match type_name.parse::<RecordType>() {
        Ok(t @ (RecordType::Booking | RecordType::Request | RecordType::User)) => t,
        _ => return Err(ApiError(ExportError::InvalidType(type_name.to_string()))),
    };
    let spec = ExportSpec::new(record_type, date_range(&params));
    run_spec(state, headers, spec).await
}

/// Unwrap a JSON body, turning an unreadable one into `invalid`.
fn json_body(
    body: Result<Json<Value>, JsonRejection>,
    invalid: impl FnOnce() -> ExportError,
) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected request body");
            Err(ApiError(invalid()))
        }
    }
}

async fn export_filter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body, || ExportError::InvalidType(String::new()))?;
    let type_name = body.get("type").and_then(Value::as_str).unwrap_or_default();
    let spec = ExportSpec::parse(type_name, body.get("filters")).map_err(ExportError::from)?;
    run_spec(state, headers, spec).await
}

async fn export_rows(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body, || ExportError::InvalidRows("rows must be an array".into()))?;
    let request = RowsExport::from_json(&body)?;
    let base = state.base_url(&headers);
    run_blocking(move || state.exporter.export_rows(&request, &base)).await
}

/// Build the HTTP router: report routes under `/api/reports` plus the static
/// file service for stored reports.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/stock", get(stock_report))
        .route("/customers", get(customers_report))
        .route("/download", get(download_report))
        .route("/export-filter", post(export_filter))
        .route("/export", post(export_rows));

    let files = ServeDir::new(&state.reports_dir);
    let router = Router::new().nest("/api/reports", api);
    let router = if state.files_prefix == "/" {
        router.fallback_service(files)
    } else {
        router.nest_service(&state.files_prefix, files)
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
