//! HTTP client for the prepaid-transaction provider.

use super::{OrderReceipt, PackageOrder, PurchaseApi, PurchaseError};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpPurchaseApi {
    client: Client,
    url: String,
    api_key: String,
    secret_key: String,
    max_retry_elapsed: Duration,
}

impl HttpPurchaseApi {
    pub fn new(url: String, api_key: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
            secret_key,
            max_retry_elapsed: Duration::from_secs(30),
        }
    }

    /// Upper bound on time spent retrying a single package.
    pub fn with_max_retry_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_retry_elapsed = elapsed;
        self
    }
}

/// Classify a send failure. Only failures to connect are known not to have
/// reached the provider, so only those are retried.
fn classify_send_error(err: reqwest::Error) -> backoff::Error<PurchaseError> {
    if err.is_connect() {
        backoff::Error::transient(PurchaseError::NetworkError(err.to_string()))
    } else {
        backoff::Error::permanent(PurchaseError::NetworkError(err.to_string()))
    }
}

#[async_trait]
impl PurchaseApi for HttpPurchaseApi {
    async fn place_order(&self, order: &PackageOrder) -> Result<OrderReceipt, PurchaseError> {
        debug!(uid = %order.uid, server = %order.server_id, product = %order.product_code, "Placing package order");

        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..Default::default()
        };

        let body = retry(backoff, || async move {
            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .header("Signature", &self.secret_key)
                .json(order)
                .send()
                .await
                .map_err(classify_send_error)?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Purchase API rate limited, backing off");
                return Err(backoff::Error::transient(PurchaseError::RateLimited));
            }

            let text = response.text().await.map_err(|e| {
                backoff::Error::permanent(PurchaseError::NetworkError(e.to_string()))
            })?;
            if !status.is_success() && text.trim().is_empty() {
                return Err(backoff::Error::permanent(PurchaseError::HttpError {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("error").to_string(),
                }));
            }
            Ok(text)
        })
        .await?;

        parse_receipt(&body)
    }
}

/// Parse `{"data": {"status": ...}, "message": ...}`; status may be a string
/// or a number.
fn parse_receipt(body: &str) -> Result<OrderReceipt, PurchaseError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PurchaseError::ParseError(e.to_string()))?;

    let status = json
        .get("data")
        .and_then(|d| d.get("status"))
        .and_then(|s| match s {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    let message = json
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string);

    Ok(OrderReceipt { status, message })
}
