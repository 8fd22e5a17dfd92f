//! Scripted purchase API for tests without network calls.

use super::{OrderReceipt, PackageOrder, PurchaseApi, PurchaseError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns scripted results in order, then accepts every further order.
#[derive(Debug, Default)]
pub struct MockPurchaseApi {
    script: Mutex<VecDeque<Result<OrderReceipt, PurchaseError>>>,
    placed: Mutex<Vec<PackageOrder>>,
}

impl MockPurchaseApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(self) -> Self {
        self.push(Ok(OrderReceipt {
            status: Some("Success".to_string()),
            message: None,
        }))
    }

    pub fn reject(self, message: &str) -> Self {
        self.push(Ok(OrderReceipt {
            status: Some("Failed".to_string()),
            message: Some(message.to_string()),
        }))
    }

    pub fn fail(self, err: PurchaseError) -> Self {
        self.push(Err(err))
    }

    fn push(self, result: Result<OrderReceipt, PurchaseError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
        self
    }

    /// Every order received so far.
    pub fn placed(&self) -> Vec<PackageOrder> {
        self.placed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PurchaseApi for MockPurchaseApi {
    async fn place_order(&self, order: &PackageOrder) -> Result<OrderReceipt, PurchaseError> {
        if let Ok(mut placed) = self.placed.lock() {
            placed.push(order.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| {
            Ok(OrderReceipt {
                status: Some("1".to_string()),
                message: None,
            })
        })
    }
}
