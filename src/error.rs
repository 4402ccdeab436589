use std::path::PathBuf;

use serde::Deserialize;

// =========================================================
// Error kinds
// =========================================================

/// Semantic category of an [`ApiError`], mirroring how views react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Rejected client-side before any request was dispatched.
    Validation,
    /// Network unreachable, timeout, or the request could not be built.
    Transport,
    /// 401: missing or expired credential.
    Unauthorized,
    /// 403: authenticated but not allowed.
    Forbidden,
    /// 404
    NotFound,
    /// 400/422: business-rule rejection (class full, duplicate enrollment, ...).
    BadRequest,
    /// 409
    Conflict,
    /// 5xx
    Server,
    /// 2xx with a body that does not match the expected record.
    Decode,
    /// Durable session storage failed.
    Storage,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            s if s >= 500 => ApiErrorKind::Server,
            _ => ApiErrorKind::BadRequest,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Validation => "VALIDATION_FAILED",
            ApiErrorKind::Transport => "TRANSPORT_ERROR",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Forbidden => "FORBIDDEN",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::BadRequest => "BAD_REQUEST",
            ApiErrorKind::Conflict => "RESOURCE_CONFLICT",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Decode => "RESPONSE_DECODE_ERROR",
            ApiErrorKind::Storage => "SESSION_STORAGE_ERROR",
        }
    }

    /// Whether a manual retry of the same call can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiErrorKind::Transport | ApiErrorKind::Server)
    }
}

// =========================================================
// Operation trail
// =========================================================

/// One breadcrumb of the operation chain an error travelled through,
/// e.g. `auth.login` or `classes.delete(c1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    pub operation: String,
    pub detail: Option<String>,
}

fn render_spans(spans: &[ErrorSpan]) -> String {
    if spans.is_empty() {
        return String::new();
    }
    let trail: Vec<String> = spans
        .iter()
        .map(|span| match &span.detail {
            Some(detail) => format!("{}({})", span.operation, detail),
            None => span.operation.clone(),
        })
        .collect();
    format!(" | trace: {}", trail.join(" -> "))
}

// =========================================================
// ApiError
// =========================================================

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The structured failure every gateway and façade call surfaces.
///
/// Carries the HTTP status when one was received and the server-supplied
/// message when the body had one.
#[derive(Debug, thiserror::Error)]
#[error("[{}] {}{}", .kind.error_code(), .message, render_spans(.spans))]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    message: String,
    spans: Vec<ErrorSpan>,
    #[source]
    source: Option<BoxedSource>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            spans: Vec::new(),
            source: None,
        }
    }

    /// Build from a non-2xx response, extracting the server's message from the body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| format!("HTTP {}", status));
        Self {
            status: Some(status),
            ..Self::new(ApiErrorKind::from_status(status), message)
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind == ApiErrorKind::Forbidden
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// Text suitable for showing to the user.
    ///
    /// Business-rule rejections pass the backend's message through verbatim;
    /// everything else gets a generic line.
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Validation => self.message.clone(),
            ApiErrorKind::BadRequest | ApiErrorKind::NotFound | ApiErrorKind::Conflict
                if !self.message.is_empty() && self.status.is_some() =>
            {
                self.message.clone()
            }
            ApiErrorKind::Transport => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiErrorKind::Unauthorized | ApiErrorKind::Forbidden => format!(
                "You are not authorized to perform this action (HTTP {}).",
                self.status.unwrap_or(if self.is_forbidden() { 403 } else { 401 })
            ),
            ApiErrorKind::Server => "Something went wrong on our side. Please try again.".to_string(),
            ApiErrorKind::Decode => "Received an unexpected response from the server.".to_string(),
            ApiErrorKind::Storage => "Could not save your session on this device.".to_string(),
            _ => "Request failed. Please try again.".to_string(),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Attach an operation breadcrumb to the error side of a result.
pub trait ResultExt<T> {
    fn in_op(self, operation: &str) -> ApiResult<T>;
    fn in_op_with(self, operation: &str, detail: &str) -> ApiResult<T>;
}

impl<T> ResultExt<T> for ApiResult<T> {
    fn in_op(self, operation: &str) -> ApiResult<T> {
        self.map_err(|e| e.in_op(operation))
    }

    fn in_op_with(self, operation: &str, detail: &str) -> ApiResult<T> {
        self.map_err(|e| e.in_op_with(operation, detail))
    }
}

// =========================================================
// Server error bodies
// =========================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    #[serde(default)]
    msg: String,
    #[serde(default)]
    loc: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
    message: Option<String>,
}

/// Extract the human-readable message from a backend error body.
///
/// Understands `{"detail": "..."}`, the list-of-issues form used for request
/// validation failures, and `{"message": "..."}`. Non-JSON bodies are used as
/// plain text when short enough to be a message.
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(ErrorBody {
            detail: Some(Detail::Text(text)),
            ..
        }) => Some(text),
        Ok(ErrorBody {
            detail: Some(Detail::Items(items)),
            ..
        }) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter(|item| !item.msg.is_empty())
                .map(|item| match item.loc.last().and_then(|v| v.as_str()) {
                    Some(field) => format!("{}: {}", field, item.msg),
                    None => item.msg,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Ok(ErrorBody {
            message: Some(text),
            ..
        }) => Some(text),
        Ok(_) => None,
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

// =========================================================
// Storage & validation
// =========================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage I/O failed at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage serialization failed")]
    Serialize(#[from] serde_json::Error),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::new(ApiErrorKind::Storage, e.to_string()).with_source(e)
    }
}

/// A client-side form check that failed before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field } | ValidationError::Invalid { field, .. } => field,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::new(ApiErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL {value:?}: {reason}")]
    InvalidBackendUrl { value: String, reason: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("admin allow-list is empty")]
    EmptyAdminList,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_kind() {
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Unauthorized);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::Forbidden);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::BadRequest);
        assert_eq!(ApiErrorKind::from_status(503), ApiErrorKind::Server);
    }

    #[test]
    fn detail_string_is_passed_through_verbatim() {
        let err = ApiError::from_response(400, r#"{"detail":"Class is full"}"#);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "Class is full");
        assert_eq!(err.user_message(), "Class is full");
    }

    #[test]
    fn validation_detail_list_is_flattened() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"}]}"#;
        assert_eq!(
            server_message(body).as_deref(),
            Some("email: value is not a valid email address")
        );
    }

    #[test]
    fn html_error_pages_are_not_used_as_messages() {
        let err = ApiError::from_response(502, "<html><body>Bad Gateway</body></html>");
        assert_eq!(err.message(), "HTTP 502");
        assert_eq!(err.kind(), ApiErrorKind::Server);
    }

    #[test]
    fn forbidden_gets_generic_message_with_status() {
        let err = ApiError::from_response(403, r#"{"detail":"Admin access required"}"#);
        assert!(err.is_forbidden());
        assert_eq!(
            err.user_message(),
            "You are not authorized to perform this action (HTTP 403)."
        );
    }

    #[test]
    fn display_includes_trace() {
        let err = ApiError::from_response(404, r#"{"detail":"Class not found"}"#)
            .in_op_with("classes.get", "c1")
            .in_op("dashboard.load");
        assert_eq!(
            err.to_string(),
            "[RESOURCE_NOT_FOUND] Class not found | trace: classes.get(c1) -> dashboard.load"
        );
    }

    #[test]
    fn validation_error_converts_to_inline_message() {
        let err: ApiError = ValidationError::Missing { field: "email" }.into();
        assert_eq!(err.kind(), ApiErrorKind::Validation);
        assert_eq!(err.user_message(), "email is required");
        assert!(err.status().is_none());
    }
}
