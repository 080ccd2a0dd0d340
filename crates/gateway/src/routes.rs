use {
    axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    serde_json::json,
    tracing::error,
};

use waygate_common::GatewayError;

use crate::state::AppState;

// ── Error mapping ────────────────────────────────────────────────────────────

/// Wrapper mapping core errors onto HTTP responses. Every failure body is
/// `{"error": "..."}`.
pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GatewayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InitializationFailed(_)
            | GatewayError::DeliveryFailed(_)
            | GatewayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": state.version,
        "tenants": state.manager.active_sessions(),
    }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snap = state.manager.get_status(&tenant_id).await?;
    Ok(Json(json!({
        "status": snap.state,
        "isConnected": snap.is_connected,
        "error": snap.error,
    })))
}

pub async fn qr(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = state.manager.get_pairing_payload(&tenant_id).await?;
    Ok(Json(json!({ "qr": payload })))
}

pub async fn reset_connection(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.reset(&tenant_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Request body for `POST /send-message/{tenant_id}`. Missing fields
/// default to empty and are rejected by the manager's validation, which
/// keeps "absent" and "empty" on the same 400 path.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageBody {
    pub phone: String,
    pub message: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .manager
        .send_message(&tenant_id, &body.phone, &body.message)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use {super::*, anyhow::anyhow};

    fn status_of(e: GatewayError) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            status_of(GatewayError::invalid("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GatewayError::NotFound("qr".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(GatewayError::InitializationFailed(anyhow!("x"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GatewayError::DeliveryFailed(anyhow!("x"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GatewayError::Store(anyhow!("x"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_body_fields_default_to_empty() {
        let body: SendMessageBody = serde_json::from_str("{}").unwrap();
        assert!(body.phone.is_empty());
        assert!(body.message.is_empty());
    }
}
