//! Request and response types for the HTTP API
//!
//! Field names are camelCase on the wire.

use crate::error::PanelError;
use crate::panel::{ClientUpdate, ClientView, NewClient};
use crate::roster::Client;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Body of `POST /api/client`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Days until expiry
    #[serde(default, deserialize_with = "deserialize_expiry_days")]
    pub expiry_days: Option<i64>,
    /// Operator notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreateClientRequest> for NewClient {
    fn from(req: CreateClientRequest) -> Self {
        Self {
            name: req.name,
            expiry_days: req.expiry_days,
            notes: req.notes,
        }
    }
}

/// Body of `PUT /api/client/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    /// Replacement notes; absent or null leaves them untouched
    #[serde(default)]
    pub notes: Option<String>,
    /// New expiry; absent leaves it untouched, null or empty clears it
    #[serde(default, deserialize_with = "deserialize_expiry_days")]
    pub expiry_days: Option<i64>,
}

impl From<UpdateClientRequest> for ClientUpdate {
    fn from(req: UpdateClientRequest) -> Self {
        Self {
            notes: req.notes,
            expiry_days: req.expiry_days,
        }
    }
}

/// Dashboard view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Every client with telemetry
    pub clients: Vec<ClientView>,
    /// Public host clients connect to
    pub wg_host: String,
}

/// A created or updated client
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    /// Always true
    pub success: bool,
    /// The stored record
    pub client: Client,
}

impl ClientResponse {
    /// Wrap a client
    pub fn new(client: Client) -> Self {
        Self {
            success: true,
            client,
        }
    }
}

/// Bare acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always true
    pub success: bool,
}

impl SuccessResponse {
    /// Successful acknowledgement
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Result of a toggle
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// Always true
    pub success: bool,
    /// New state of the client
    pub enabled: bool,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request or failed validation
    #[error("{0}")]
    BadRequest(String),

    /// Unknown client
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with the current roster
    #[error("{0}")]
    Conflict(String),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        match err {
            PanelError::Validation(_) | PanelError::InvalidState(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PanelError::NotFound(_) => ApiError::NotFound("Client not found".to_string()),
            PanelError::AddressPoolExhausted(_) => ApiError::Conflict(err.to_string()),
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Extracts a body sent either as JSON or as a url-encoded form
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Accepts a number, a numeric string, `null` or `""` for `expiryDays`
///
/// Strings are read up to the first non-digit, so `"30 days"` is 30. Null,
/// empty and non-numeric strings map to 0, which means no expiry.
fn deserialize_expiry_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ExpiryDaysVisitor;

    impl<'de> Visitor<'de> for ExpiryDaysVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number of days, a numeric string or null")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_finite() {
                Ok(Some(v.trunc() as i64))
            } else {
                Ok(Some(0))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(parse_leading_int(v)))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Some(0))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Some(0))
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(ExpiryDaysVisitor)
}

/// Leading optionally-signed integer of `s`, or 0 if there is none
fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(match end {
        0 => 0,
        _ => i64::MAX,
    });

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_days_from_json_number() {
        let req: CreateClientRequest =
            serde_json::from_str(r#"{"name":"laptop","expiryDays":30}"#).unwrap();
        assert_eq!(req.name, "laptop");
        assert_eq!(req.expiry_days, Some(30));
    }

    #[test]
    fn test_expiry_days_from_string() {
        let req: CreateClientRequest =
            serde_json::from_str(r#"{"name":"laptop","expiryDays":"7"}"#).unwrap();
        assert_eq!(req.expiry_days, Some(7));
    }

    #[test]
    fn test_expiry_days_empty_and_null_clear() {
        let req: UpdateClientRequest = serde_json::from_str(r#"{"expiryDays":""}"#).unwrap();
        assert_eq!(req.expiry_days, Some(0));

        let req: UpdateClientRequest = serde_json::from_str(r#"{"expiryDays":null}"#).unwrap();
        assert_eq!(req.expiry_days, Some(0));
    }

    #[test]
    fn test_expiry_days_absent_is_untouched() {
        let req: UpdateClientRequest = serde_json::from_str(r#"{"notes":"x"}"#).unwrap();
        assert_eq!(req.expiry_days, None);
        assert_eq!(req.notes.as_deref(), Some("x"));
    }

    #[test]
    fn test_missing_name_defaults_to_empty() {
        let req: CreateClientRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_empty());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("30"), 30);
        assert_eq!(parse_leading_int(" 30 days"), 30);
        assert_eq!(parse_leading_int("-5"), -5);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
    }

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = PanelError::Validation("Name is required".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Name is required");

        let err: ApiError = PanelError::NotFound("abc".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = PanelError::AddressPoolExhausted("10.8.0.x".to_string()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = PanelError::Command("wg set failed".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
