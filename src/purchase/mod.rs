//! Purchase API abstraction for admin package orders.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpPurchaseApi;
pub use mock::MockPurchaseApi;

/// Status values the provider uses for an accepted order.
const ACCEPTED_STATUSES: [&str; 4] = ["1", "Pending", "Success", "success"];

/// One package to buy for a game account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOrder {
    #[serde(rename = "target_product_code")]
    pub product_code: String,
    /// Game account id.
    #[serde(rename = "id")]
    pub uid: String,
    /// Game server id.
    #[serde(rename = "server")]
    pub server_id: String,
}

/// Provider's answer for one package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderReceipt {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl OrderReceipt {
    pub fn is_accepted(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| ACCEPTED_STATUSES.contains(&s))
            .unwrap_or(false)
    }
}

/// Places package orders with the external provider.
///
/// Implementations must never resend a request that may have reached the
/// provider: a duplicate would be a second purchase.
#[async_trait]
pub trait PurchaseApi: Send + Sync + fmt::Debug {
    async fn place_order(&self, order: &PackageOrder) -> Result<OrderReceipt, PurchaseError>;
}

/// Error type for purchase API calls.
#[derive(Debug, Clone)]
pub enum PurchaseError {
    /// Network error (connection failure, timeout)
    NetworkError(String),
    /// HTTP error status without a usable body
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit still in effect after retries
    RateLimited,
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            PurchaseError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            PurchaseError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            PurchaseError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for PurchaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(status: Option<&str>) -> OrderReceipt {
        OrderReceipt {
            status: status.map(str::to_string),
            message: None,
        }
    }

    #[test]
    fn test_accepted_statuses() {
        for status in ["1", "Pending", "Success", "success"] {
            assert!(receipt(Some(status)).is_accepted(), "{}", status);
        }
        assert!(!receipt(Some("0")).is_accepted());
        assert!(!receipt(Some("Failed")).is_accepted());
        assert!(!receipt(None).is_accepted());
    }

    #[test]
    fn test_order_wire_format() {
        let order = PackageOrder {
            product_code: "OPM_6".to_string(),
            uid: "123".to_string(),
            server_id: "9".to_string(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"target_product_code": "OPM_6", "id": "123", "server": "9"})
        );
    }

    #[test]
    fn test_purchase_error_display() {
        let err = PurchaseError::HttpError {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 502: Bad gateway");
        assert_eq!(PurchaseError::RateLimited.to_string(), "Rate limited");
    }
}
