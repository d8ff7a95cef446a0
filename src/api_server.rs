// Axum API Server Module
//
// Purpose: HTTP surface for the BNS legal assistant
//   GET  /                      HTML test page
//   GET  /health                service status
//   POST /api/ask               RAG-lite question answering
//   GET  /api/sections          browse/search sections
//   GET  /api/sections/:id      single section
//   GET  /api/categories        distinct categories
//   GET  /api/metadata          dataset metadata

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use crate::answer::AnswerService;
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::llm::{ChatModel, GroqClient};
use crate::section_store::{SectionFilter, SectionRecord, SectionStore, DEFAULT_PAGE_SIZE};

pub const API_NAME: &str = "Legally - BNS Legal AI";
pub const API_VERSION: &str = "1.0.0";
pub const LEGAL_FRAMEWORK: &str = "Bharatiya Nyaya Sanhita, 2023";

const FALLBACK_INDEX_HTML: &str =
    "<h1>Legally API</h1><p>API is running but index.html not found</p>";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SectionStore>,
    pub answer: Arc<AnswerService>,
    pub index_html_path: PathBuf,
}

impl AppState {
    /// Load the dataset and build the Groq-backed answer service
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading BNS dataset from {}...", config.data_path.display());
        let store = Arc::new(SectionStore::load(&config.data_path)?);

        tracing::info!("Initializing Groq client (model {})...", config.llm.model);
        let groq = GroqClient::new(config.llm.clone())?;
        if !groq.has_api_key() {
            tracing::warn!("GROQ_API_KEY not set; /api/ask will fail until it is configured");
        }

        Ok(Self::with_model(store, Arc::new(groq), config.index_html_path.clone()))
    }

    /// Assemble state around any chat model
    pub fn with_model(
        store: Arc<SectionStore>,
        model: Arc<dyn ChatModel>,
        index_html_path: PathBuf,
    ) -> Self {
        let answer = Arc::new(AnswerService::new(store.clone(), model));
        Self {
            store,
            answer,
            index_html_path,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Test page + health
        .route("/", get(index_page))
        .route("/health", get(health_check))

        // Question answering
        .route("/api/ask", post(ask_legal_ai))

        // Section browsing
        .route("/api/sections", get(list_sections))
        .route("/api/sections/:id", get(get_section))
        .route("/api/categories", get(get_categories))
        .route("/api/metadata", get(get_metadata))

        // Middleware (applied in reverse order)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // FlutterFlow + mobile clients call from any origin
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured host and port; hostnames ("localhost") and bare IPv6 ("::") both work
pub async fn bind_listener(config: &AppConfig) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn index_page(State(state): State<AppState>) -> Html<String> {
    match tokio::fs::read_to_string(&state.index_html_path).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::debug!(
                "Index page {} unavailable: {}",
                state.index_html_path.display(),
                e
            );
            Html(FALLBACK_INDEX_HTML.to_string())
        }
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "api": API_NAME,
        "version": API_VERSION,
        "legal_framework": LEGAL_FRAMEWORK,
        "total_sections": state.store.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn ask_legal_ai(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected /api/ask body: {}", rejection.body_text());
        AppError::BadRequest("Please provide a valid question".to_string())
    })?;

    let start = std::time::Instant::now();
    let reply = state.answer.answer(&request.message).await?;
    tracing::info!("Answered question in {:?}", start.elapsed());

    Ok(Json(AskResponse { reply }))
}

async fn list_sections(
    State(state): State<AppState>,
    params: Result<Query<SectionsQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let filter = SectionFilter {
        search: params.search,
        category: params.category,
        limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: params.offset.unwrap_or(0),
    };

    let page = state.store.list(&filter);
    tracing::debug!(
        "Section browse {:?}: {} of {} matches",
        filter,
        page.sections.len(),
        page.total
    );

    Ok(Json(page).into_response())
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SectionRecord>, AppError> {
    state
        .store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Section {} not found", id)).into())
}

async fn get_categories(State(state): State<AppState>) -> Json<serde_json::Value> {
    let categories = state.store.categories();
    Json(serde_json::json!({
        "total": categories.len(),
        "categories": categories,
    }))
}

async fn get_metadata(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.metadata().clone())
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// `message` defaults to empty so a missing field is rejected as a short question
#[derive(serde::Deserialize, Debug)]
pub struct AskRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct AskResponse {
    pub reply: String,
}

#[derive(serde::Deserialize, Debug)]
struct SectionsQuery {
    search: Option<String>,
    category: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    GatewayTimeout(String),
    Upstream(StatusCode, String),
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidInput(msg) => AppError::BadRequest(msg),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                AppError::Internal(msg)
            }
            ServiceError::UpstreamTimeout => AppError::GatewayTimeout("AI service timeout".to_string()),
            ServiceError::Upstream { status, message } => {
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                AppError::Upstream(status, message)
            }
            ServiceError::Internal(msg) => {
                AppError::Internal(format!("Internal server error: {}", msg))
            }
        }
    }
}

/// Turn a handler panic into the usual JSON 500 instead of dropping the connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let reason = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", reason);

    AppError::from(ServiceError::Internal("unexpected failure".to_string())).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Upstream(status, msg) => (status, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}
