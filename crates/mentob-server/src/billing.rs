//! Checkout and payment-status proxy to the external billing backend.
//!
//! The backend owns prices, checkout sessions and entitlements; this module
//! only reshapes requests, forwards the caller's `Authorization` header and
//! maps failures into the API envelope.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get, routing::post};
use mentob_config::BillingConfig;
use mentob_metrics::record_billing_request;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ErrorCode, success};
use crate::state::AppState;

/// Billing backend error.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// The backend could not be reached.
    #[error("transport: {0}")]
    Transport(String),
    /// The backend answered with an error status or `success: false`.
    #[error("backend returned status {status}")]
    Backend { status: u16, error: Option<Value> },
    /// The backend answered with something other than the expected JSON.
    #[error("decode: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        warn!(error = %err, "billing backend error");
        match err {
            BillingError::Backend { status, error } => {
                let message = error
                    .as_ref()
                    .and_then(|e| e.get("message").and_then(Value::as_str).or(e.as_str()))
                    .unwrap_or("billing backend request failed")
                    .to_string();
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                let mut api = ApiError::new(ErrorCode::BackendError, message).with_status(status);
                if let Some(error) = error {
                    api = api.with_details(error);
                }
                api
            }
            other => ApiError::new(ErrorCode::BackendError, "billing backend is unavailable")
                .with_details(Value::String(other.to_string())),
        }
    }
}

/// Checkout request as sent by clients; camelCase and snake_case are both accepted.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default, alias = "priceId")]
    pub price_id: Option<String>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default, alias = "userEmail")]
    pub user_email: Option<String>,
    #[serde(default, alias = "successUrl")]
    pub success_url: Option<String>,
    #[serde(default, alias = "cancelUrl")]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct BackendCheckout<'a> {
    price_id: &'a str,
    user_id: &'a str,
    user_email: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: Option<String>,
    pub publishable_key: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// HTTP client for the billing backend.
pub struct BillingClient {
    http: reqwest::Client,
    base_url: String,
    success_url: String,
    cancel_url: String,
    publishable_key: Option<String>,
}

impl BillingClient {
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
            publishable_key: config.publishable_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a checkout session. Missing redirect URLs fall back to the
    /// configured ones.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        lang: &str,
        authorization: Option<&str>,
    ) -> Result<CheckoutSession, BillingError> {
        let (Some(price_id), Some(user_id), Some(user_email)) = (
            non_empty(&request.price_id),
            non_empty(&request.user_id),
            non_empty(&request.user_email),
        ) else {
            // Checked by the handler; kept so the client is safe to call directly.
            return Err(BillingError::Backend {
                status: 400,
                error: None,
            });
        };

        let body = BackendCheckout {
            price_id,
            user_id,
            user_email,
            success_url: non_empty(&request.success_url).unwrap_or(&self.success_url),
            cancel_url: non_empty(&request.cancel_url).unwrap_or(&self.cancel_url),
        };
        debug!(price_id, user_id, lang, "creating checkout session");

        let mut builder = self
            .http
            .post(self.url("/api/stripe/create-checkout-session"))
            .query(&[("lang", lang)])
            .json(&body);
        if let Some(auth) = authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let data = envelope_data(builder.send().await?).await?;

        let session_id = data
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BillingError::Decode("missing sessionId".into()))?;
        Ok(CheckoutSession {
            session_id: session_id.to_string(),
            url: data.get("url").and_then(Value::as_str).map(str::to_string),
            publishable_key: self.publishable_key.clone(),
        })
    }

    /// Payment status of a checkout session, as reported by the backend.
    pub async fn payment_status(
        &self,
        session_id: &str,
        authorization: Option<&str>,
    ) -> Result<Value, BillingError> {
        let mut builder = self
            .http
            .get(self.url(&format!("/api/stripe/payment-status/{session_id}")));
        if let Some(auth) = authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = read_json(response).await;
        match body {
            Ok(value) if status.is_success() => Ok(value),
            Ok(value) => Err(BillingError::Backend {
                status: status.as_u16(),
                error: value.get("error").cloned(),
            }),
            Err(_) if !status.is_success() => Err(BillingError::Backend {
                status: status.as_u16(),
                error: None,
            }),
            Err(e) => Err(e),
        }
    }

    /// Price configuration for the pricing page.
    pub async fn price_config(&self, lang: &str) -> Result<Value, BillingError> {
        let response = self
            .http
            .get(self.url("/api/stripe/config"))
            .query(&[("lang", lang)])
            .send()
            .await?;
        envelope_data(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, BillingError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| BillingError::Decode(e.to_string()))
}

/// Unwrap a `{success, data, error}` backend envelope.
async fn envelope_data(response: reqwest::Response) -> Result<Value, BillingError> {
    let status = response.status();
    let mut value = match read_json(response).await {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(BillingError::Backend {
                status: status.as_u16(),
                error: None,
            });
        }
        Err(e) => return Err(e),
    };

    let ok = value.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !status.is_success() || !ok {
        return Err(BillingError::Backend {
            status: status.as_u16(),
            error: value.get("error").cloned(),
        });
    }
    Ok(value.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct LangQuery {
    lang: Option<String>,
}

impl LangQuery {
    fn lang(&self) -> &str {
        self.lang.as_deref().filter(|l| !l.is_empty()).unwrap_or("en")
    }
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

fn outcome<T>(result: &Result<T, BillingError>) -> &'static str {
    if result.is_ok() { "ok" } else { "error" }
}

pub(crate) fn billing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stripe/create-checkout-session", post(create_checkout_session))
        .route("/stripe/payment-status/{session_id}", get(payment_status))
        .route("/stripe/config", get(price_config))
}

async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    if non_empty(&request.price_id).is_none()
        || non_empty(&request.user_id).is_none()
        || non_empty(&request.user_email).is_none()
    {
        return Err(ApiError::new(
            ErrorCode::MissingRequiredFields,
            "priceId, userId and userEmail are required",
        ));
    }

    let result = state
        .billing
        .create_checkout_session(&request, query.lang(), authorization(&headers))
        .await;
    record_billing_request("create_checkout_session", outcome(&result));
    Ok(success(result?).into_response())
}

async fn payment_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if session_id.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::MissingRequiredFields,
            "session id is required",
        ));
    }
    let result = state
        .billing
        .payment_status(&session_id, authorization(&headers))
        .await;
    record_billing_request("payment_status", outcome(&result));
    Ok(Json(result?).into_response())
}

async fn price_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
) -> Result<Response, ApiError> {
    let result = state.billing.price_config(query.lang()).await;
    record_billing_request("config", outcome(&result));
    Ok(success(result?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_request_accepts_both_casings() {
        let camel: CheckoutRequest = serde_json::from_str(
            r#"{"priceId":"price_1","userId":"u","userEmail":"u@example.com"}"#,
        )
        .unwrap();
        let snake: CheckoutRequest = serde_json::from_str(
            r#"{"price_id":"price_1","user_id":"u","user_email":"u@example.com","cancel_url":"x"}"#,
        )
        .unwrap();
        assert_eq!(camel.price_id.as_deref(), Some("price_1"));
        assert_eq!(snake.user_email.as_deref(), Some("u@example.com"));
        assert_eq!(snake.cancel_url.as_deref(), Some("x"));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        assert_eq!(non_empty(&Some("  ".into())), None);
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(" a ".into())), Some("a"));
    }

    #[test]
    fn backend_error_keeps_status_and_message() {
        let api = ApiError::from(BillingError::Backend {
            status: 401,
            error: Some(serde_json::json!({"code": "UNAUTHORIZED", "message": "login first"})),
        });
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.code, ErrorCode::BackendError);
        assert_eq!(api.message, "login first");
    }

    #[test]
    fn backend_success_status_with_failure_flag_is_bad_gateway() {
        let api = ApiError::from(BillingError::Backend {
            status: 200,
            error: None,
        });
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn transport_error_is_bad_gateway() {
        let api = ApiError::from(BillingError::Transport("refused".into()));
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
    }
}
