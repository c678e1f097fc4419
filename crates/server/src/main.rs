use std::{net::SocketAddr, sync::Arc};

use admin_crud::{CrudError, DEFAULT_CSRF_SECRET};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use shared::error::{ApiError, ErrorCode};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod flash_cookie;
mod users;

use crate::config::load_settings;
use app_state::AppState;

#[derive(Debug)]
pub(crate) enum HttpError {
    NotFound(&'static str),
    Storage(anyhow::Error),
    Crud(CrudError),
}

impl From<CrudError> for HttpError {
    fn from(value: CrudError) -> Self {
        Self::Crud(value)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(ErrorCode::NotFound, message)),
            )
                .into_response(),
            Self::Storage(error) => {
                error!(error = %format!("{error:#}"), "storage request failed");
                internal_error()
            }
            Self::Crud(error) => {
                error!(%error, "admin request failed");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, "internal server error")),
    )
        .into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    if settings.csrf_secret == DEFAULT_CSRF_SECRET {
        warn!("csrf_secret is left at its default; set APP__CSRF_SECRET in production");
    }

    let storage = Storage::new(&settings.database_url)
        .await
        .map_err(|error| {
            error!(
                database_url = %settings.database_url,
                %error,
                "failed to open SQLite database; verify parent directory exists and permissions are correct"
            );
            error
        })?;

    let state = AppState::new(storage, &settings);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, prefix = %settings.route_prefix, "back-office listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_form_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(|| async { Redirect::to(users::BASE_PATH) }))
        .merge(users::router())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state.storage.health_check().await.map_err(|error| {
        warn!(error = %format!("{error:#}"), "health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("ok")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
