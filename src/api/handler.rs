//! Route handlers
//!
//! Each handler is a thin adapter from HTTP to one [`PeerManager`]
//! operation.
//!
//! [`PeerManager`]: crate::panel::PeerManager

use super::dto::{
    ApiError, ClientResponse, CreateClientRequest, DashboardResponse, JsonOrForm,
    SuccessResponse, ToggleResponse, UpdateClientRequest,
};
use super::server::AppState;
use crate::monitoring::export_prometheus;
use crate::panel::Stats;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// `GET /api/clients`
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let clients = state.manager.list().await?;
    Ok(Json(DashboardResponse {
        clients,
        wg_host: state.manager.config().wireguard.host.clone(),
    }))
}

/// `POST /api/client`
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    JsonOrForm(request): JsonOrForm<CreateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.manager.create(request.into()).await?;
    Ok(Json(ClientResponse::new(client)))
}

/// `PUT /api/client/:id`
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonOrForm(request): JsonOrForm<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.manager.update(&id, request.into()).await?;
    Ok(Json(ClientResponse::new(client)))
}

/// `DELETE /api/client/:id`
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.manager.delete(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `POST /api/client/:id/toggle`
pub async fn toggle_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let enabled = state.manager.toggle(&id).await?;
    Ok(Json(ToggleResponse {
        success: true,
        enabled,
    }))
}

/// `GET /api/client/:id/config`
pub async fn download_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = state.manager.client_config(&id).await?;

    let disposition = content_disposition(&config.file_name(), &id);
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        config.contents,
    ))
}

/// `GET /api/stats`
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.manager.stats().await?))
}

/// `GET /healthz`
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// `GET /metrics` (Prometheus format)
///
/// Scrapes read a snapshot; expiry reconciliation is left to the dashboard.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.manager.snapshot().await {
        Ok(views) => (StatusCode::OK, export_prometheus(&views)),
        Err(e) => {
            warn!("Failed to collect metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("# failed to collect metrics: {}\n", e),
            )
        }
    }
}

/// `Content-Disposition` for a download named `file_name`
///
/// Non-ASCII names get an ASCII `filename` (`<id>.conf`) plus an RFC 6266
/// `filename*` carrying the UTF-8 name percent-encoded.
fn content_disposition(file_name: &str, id: &str) -> HeaderValue {
    let value = if file_name.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        debug!("Encoding non-ASCII file name for client {}", id);
        format!(
            "attachment; filename=\"{}.conf\"; filename*=UTF-8''{}",
            id,
            percent_encode(file_name)
        )
    };

    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"client.conf\""))
}

/// Percent-encode everything outside the RFC 5987 `attr-char` set
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
