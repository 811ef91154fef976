//! HTTP API
//!
//! JSON endpoints for the dashboard, a plain-text config download, plus
//! `/healthz` and `/metrics`.

mod dto;
mod handler;
mod server;

pub use dto::{
    ApiError, ClientResponse, CreateClientRequest, DashboardResponse, ErrorBody, JsonOrForm,
    SuccessResponse, ToggleResponse, UpdateClientRequest,
};
pub use server::{create_router, serve, shutdown_signal, AppState};
