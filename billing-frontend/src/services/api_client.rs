//! HTTP client for the billing REST backend.
//!
//! Every call carries W3C trace headers, is bounded by the configured timeout
//! and is counted in the backend metrics. Non-2xx responses are turned into
//! [`ApiError::Backend`] with the backend's own `{"error": ...}` message.

use crate::config::BackendSettings;
use crate::services::metrics::record_backend_call;
use billing_core::models::{NewBuyer, NewProduct, ProductUpdate};
use billing_core::numeric::lenient_decimal;
use billing_core::{Buyer, BuyerStatement, Invoice, InvoiceStatus, Product, StatementFilter};
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Backend { status: 404, .. })
    }

    /// Message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Backend { message, .. } => message.clone(),
            ApiError::Transport(e) if e.is_timeout() => "The billing backend timed out".to_string(),
            ApiError::Transport(_) => "The billing backend is unreachable".to_string(),
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
                "The billing backend sent an unexpected response".to_string()
            }
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ApiError::Backend { .. } => "backend_error",
            ApiError::Transport(_) => "transport_error",
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => "decode_error",
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Backend {
                status: 404,
                message,
            } => AppError::NotFound(anyhow::anyhow!(message)),
            ApiError::Backend {
                status: 400,
                message,
            } => AppError::BadRequest(anyhow::anyhow!(message)),
            ApiError::Transport(e) => {
                tracing::warn!(error = %e, "billing backend unavailable");
                AppError::ServiceUnavailable
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// `{"message": ..., "id": ...}` returned by create endpoints.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Created {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: String,
}

/// `{"message": ...}` returned by update and delete endpoints.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

/// Response of `PUT /products/:id/stock`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StockAdjusted {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub stock_quantity: Decimal,
}

#[derive(Deserialize)]
struct BackendErrorBody {
    error: String,
}

#[derive(Serialize)]
struct StockDelta {
    quantity: Decimal,
}

#[derive(Serialize)]
struct StatusBody {
    status: InvoiceStatus,
}

pub struct BillingApiClient {
    client: Client,
    base_url: Url,
}

impl BillingApiClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, ApiError> {
        Self::with_timeout(&settings.base_url, settings.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: TracedRequest,
    ) -> Result<T, ApiError> {
        let start = Instant::now();
        let result = Self::send_and_decode(request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                record_backend_call(operation, "ok", elapsed);
                tracing::debug!(operation, elapsed_seconds = elapsed, "backend call succeeded");
            }
            Err(e) => {
                record_backend_call(operation, e.outcome(), elapsed);
                tracing::warn!(operation, error = %e, "backend call failed");
            }
        }
        result
    }

    async fn send_and_decode<T: DeserializeOwned>(request: TracedRequest) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // Buyers

    pub async fn list_buyers(&self) -> Result<Vec<Buyer>, ApiError> {
        let url = self.endpoint(&["buyers"])?;
        self.execute("list_buyers", self.client.traced_get(&url))
            .await
    }

    pub async fn get_buyer(&self, id: &str) -> Result<Buyer, ApiError> {
        let url = self.endpoint(&["buyers", id])?;
        self.execute("get_buyer", self.client.traced_get(&url)).await
    }

    pub async fn create_buyer(&self, buyer: &NewBuyer) -> Result<Created, ApiError> {
        let url = self.endpoint(&["buyers"])?;
        self.execute("create_buyer", self.client.traced_post(&url).json(buyer))
            .await
    }

    pub async fn update_buyer(&self, id: &str, buyer: &NewBuyer) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["buyers", id])?;
        self.execute("update_buyer", self.client.traced_put(&url).json(buyer))
            .await
    }

    pub async fn delete_buyer(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["buyers", id])?;
        self.execute("delete_buyer", self.client.traced_delete(&url))
            .await
    }

    // Products

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(&["products"])?;
        self.execute("list_products", self.client.traced_get(&url))
            .await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", id])?;
        self.execute("get_product", self.client.traced_get(&url))
            .await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Created, ApiError> {
        let url = self.endpoint(&["products"])?;
        self.execute("create_product", self.client.traced_post(&url).json(product))
            .await
    }

    pub async fn update_product(
        &self,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["products", id])?;
        self.execute("update_product", self.client.traced_put(&url).json(update))
            .await
    }

    /// Add `delta` (may be negative) to the product's stock.
    pub async fn adjust_stock(&self, id: &str, delta: Decimal) -> Result<StockAdjusted, ApiError> {
        let url = self.endpoint(&["products", id, "stock"])?;
        self.execute(
            "adjust_stock",
            self.client
                .traced_put(&url)
                .json(&StockDelta { quantity: delta }),
        )
        .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["products", id])?;
        self.execute("delete_product", self.client.traced_delete(&url))
            .await
    }

    // Invoices

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        let url = self.endpoint(&["invoices"])?;
        self.execute("list_invoices", self.client.traced_get(&url))
            .await
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, ApiError> {
        let url = self.endpoint(&["invoices", id])?;
        self.execute("get_invoice", self.client.traced_get(&url))
            .await
    }

    pub async fn create_invoice(&self, payload: &Value) -> Result<Created, ApiError> {
        let url = self.endpoint(&["invoices"])?;
        self.execute("create_invoice", self.client.traced_post(&url).json(payload))
            .await
    }

    pub async fn update_invoice(&self, id: &str, payload: &Value) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["invoices", id])?;
        self.execute("update_invoice", self.client.traced_put(&url).json(payload))
            .await
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["invoices", id])?;
        self.execute("delete_invoice", self.client.traced_delete(&url))
            .await
    }

    pub async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["invoices", id, "status"])?;
        self.execute(
            "set_invoice_status",
            self.client.traced_put(&url).json(&StatusBody { status }),
        )
        .await
    }

    // Statements

    pub async fn get_statement(
        &self,
        buyer_id: &str,
        filter: &StatementFilter,
    ) -> Result<BuyerStatement, ApiError> {
        let url = self.endpoint(&["statements", buyer_id])?;
        self.execute(
            "get_statement",
            self.client.traced_get(&url).query(&filter.query_pairs()),
        )
        .await
    }
}

/// The backend's `error` field, else the raw body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<BackendErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
