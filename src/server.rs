//! HTTP surface: routes, the `{success, data?, error?, details?}` envelope
//! and the admin check for mutating endpoints.

use crate::auth::{check_admin, AuthCheck};
use crate::error::FaqError;
use crate::faq::{FaqService, HealthReport, Source};
use crate::i18n::{Language, LanguageRegistry};
use crate::models::{FaqRecord, FaqView};
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{async_trait, Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FaqService>,
    pub api_key: Option<Arc<str>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/faqs", get(list_faqs).post(create_faq))
        .route("/api/faqs/:id", put(update_faq).delete(delete_faq))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

// ==================== Envelope ====================

#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            source: None,
            message: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Map a service error; `action` names the failed operation for 500s.
    fn from_faq(err: FaqError, action: &str) -> Self {
        match err {
            FaqError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            FaqError::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            FaqError::UnsupportedLanguage(_) => ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
                .with_details(format!(
                    "Supported languages: {}",
                    LanguageRegistry::get().describe_supported()
                )),
            FaqError::Store(e) => {
                error!("Error {}: {}", action, e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Error {}", action))
                    .with_details(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ==================== Admin check ====================

/// Extractor that only succeeds for requests carrying the admin API key.
pub struct Admin;

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match check_admin(state.api_key.as_deref(), &parts.headers) {
            AuthCheck::Granted => Ok(Admin),
            AuthCheck::MissingToken => Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Access denied. No token provided.",
            )),
            AuthCheck::InvalidToken => Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token.")),
        }
    }
}

// ==================== Handlers ====================

#[derive(Debug, Deserialize)]
struct ListQuery {
    lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateFaqRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

#[derive(Debug, Deserialize)]
struct UpdateFaqRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    lang: Option<String>,
}

/// A missing or blank `lang` selects the canonical language.
fn parse_language(code: Option<&str>) -> Result<Language, FaqError> {
    match code.map(str::trim) {
        Some(code) if !code.is_empty() => Language::from_code(code),
        _ => Ok(Language::canonical()),
    }
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid FAQ id: '{}'", raw)))
}

async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<Vec<FaqView>>>> {
    let language =
        parse_language(query.lang.as_deref()).map_err(|e| ApiError::from_faq(e, "fetching FAQs"))?;

    let list = state
        .service
        .list(language)
        .await
        .map_err(|e| ApiError::from_faq(e, "fetching FAQs"))?;

    Ok(Json(Envelope {
        source: Some(list.source),
        ..Envelope::ok(list.faqs)
    }))
}

async fn create_faq(
    State(state): State<AppState>,
    _admin: Admin,
    payload: Result<Json<CreateFaqRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<FaqRecord>>)> {
    let Json(request) = payload?;

    let record = state
        .service
        .create(&request.question, &request.answer)
        .await
        .map_err(|e| ApiError::from_faq(e, "creating FAQ"))?;

    Ok((StatusCode::CREATED, Json(Envelope::ok(record))))
}

async fn update_faq(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFaqRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<FaqRecord>>> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let language =
        parse_language(request.lang.as_deref()).map_err(|e| ApiError::from_faq(e, "updating FAQ"))?;

    let record = state
        .service
        .update(id, &request.question, &request.answer, language)
        .await
        .map_err(|e| ApiError::from_faq(e, "updating FAQ"))?;

    Ok(Json(Envelope::ok(record)))
}

async fn delete_faq(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<FaqRecord>>> {
    let id = parse_id(&id)?;

    let record = state
        .service
        .delete(id)
        .await
        .map_err(|e| ApiError::from_faq(e, "deleting FAQ"))?;

    Ok(Json(Envelope {
        message: Some("FAQ deleted successfully"),
        ..Envelope::ok(record)
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Envelope<HealthReport>>) {
    let report = state.service.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(Envelope {
            success: report.is_healthy(),
            ..Envelope::ok(report)
        }),
    )
}
