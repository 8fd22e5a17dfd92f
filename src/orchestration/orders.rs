//! Agency package orders, optionally charged to a web shop balance.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PurchaseConfig;
use crate::db::{StoreError, WebWallet};
use crate::purchase::{PackageOrder, PurchaseApi};

/// Largest number of packages one order may request.
pub const MAX_ORDER_QUANTITY: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub uid: String,
    pub server_id: String,
    pub quantity: u32,
    /// Web shop user to charge; orders are free when absent.
    #[serde(default)]
    pub charge_to: Option<String>,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("quantity must be between 1 and 100, got {0}")]
    InvalidQuantity(u32),
    #[error("web user {0} not found")]
    UnknownWebUser(String),
    #[error("web user {username} has {balance}, order costs {cost}")]
    InsufficientWebBalance {
        username: String,
        balance: i64,
        cost: i64,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResult {
    /// 1-based package number.
    pub index: u32,
    pub accepted: bool,
    /// Provider message or failure reason.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    pub batch_id: Uuid,
    pub requested: u32,
    pub succeeded: u32,
    pub packages: Vec<PackageResult>,
    pub charged: i64,
    pub refunded: i64,
    /// Set when the refund for failed packages could not be applied.
    pub refund_error: Option<String>,
}

impl OrderReport {
    pub fn failed(&self) -> u32 {
        self.requested - self.succeeded
    }
}

/// Places packages one at a time and settles the web shop charge.
#[derive(Debug, Clone)]
pub struct OrderRunner {
    api: Arc<dyn PurchaseApi>,
    wallet: Arc<dyn WebWallet>,
    config: PurchaseConfig,
}

impl OrderRunner {
    pub fn new(api: Arc<dyn PurchaseApi>, wallet: Arc<dyn WebWallet>, config: PurchaseConfig) -> Self {
        Self {
            api,
            wallet,
            config,
        }
    }

    fn cost_of(&self, packages: u32) -> Option<i64> {
        self.config.price_per_pack.checked_mul(i64::from(packages))
    }

    /// Debit the full order up front. Returns the amount charged.
    async fn charge(&self, username: &str, quantity: u32) -> Result<i64, OrderError> {
        let user = self
            .wallet
            .find_web_user(username)
            .await?
            .ok_or_else(|| OrderError::UnknownWebUser(username.to_string()))?;

        let cost = self.cost_of(quantity).unwrap_or(i64::MAX);
        let insufficient = || OrderError::InsufficientWebBalance {
            username: username.to_string(),
            balance: user.balance,
            cost,
        };
        if user.balance < cost {
            return Err(insufficient());
        }
        // The balance may have moved since the lookup; the conditional update decides.
        if !self.wallet.adjust_web_balance(username, -cost).await? {
            return Err(insufficient());
        }
        Ok(cost)
    }

    pub async fn run(&self, request: &OrderRequest) -> Result<OrderReport, OrderError> {
        if !(1..=MAX_ORDER_QUANTITY).contains(&request.quantity) {
            return Err(OrderError::InvalidQuantity(request.quantity));
        }

        let charged = match &request.charge_to {
            Some(username) => self.charge(username, request.quantity).await?,
            None => 0,
        };

        let batch_id = Uuid::new_v4();
        info!(
            %batch_id,
            uid = %request.uid,
            server = %request.server_id,
            quantity = request.quantity,
            charged,
            "Starting package order"
        );

        let order = PackageOrder {
            product_code: self.config.product_code.clone(),
            uid: request.uid.clone(),
            server_id: request.server_id.clone(),
        };

        let mut packages = Vec::new();
        let mut succeeded = 0;
        for index in 1..=request.quantity {
            let result = match self.api.place_order(&order).await {
                Ok(receipt) if receipt.is_accepted() => PackageResult {
                    index,
                    accepted: true,
                    detail: receipt.message,
                },
                Ok(receipt) => {
                    warn!(%batch_id, index, status = ?receipt.status, "Package rejected by provider");
                    PackageResult {
                        index,
                        accepted: false,
                        detail: receipt.message.or(receipt.status),
                    }
                }
                Err(e) => {
                    warn!(%batch_id, index, error = %e, "Package order failed");
                    PackageResult {
                        index,
                        accepted: false,
                        detail: Some(e.to_string()),
                    }
                }
            };

            let pause = result.accepted && index < request.quantity;
            if result.accepted {
                succeeded += 1;
            }
            packages.push(result);

            if pause && !self.config.interval.is_zero() {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        let mut report = OrderReport {
            batch_id,
            requested: request.quantity,
            succeeded,
            packages,
            charged,
            refunded: 0,
            refund_error: None,
        };

        if let Some(username) = &request.charge_to {
            self.refund(username, &mut report).await;
        }

        info!(
            %batch_id,
            succeeded = report.succeeded,
            failed = report.failed(),
            refunded = report.refunded,
            "Package order finished"
        );
        Ok(report)
    }

    async fn refund(&self, username: &str, report: &mut OrderReport) {
        let refund = match self.cost_of(report.failed()) {
            Some(0) => return,
            Some(amount) => amount,
            None => {
                report.refund_error = Some("refund amount overflows".to_string());
                return;
            }
        };

        match self.wallet.adjust_web_balance(username, refund).await {
            Ok(true) => report.refunded = refund,
            Ok(false) => {
                error!(batch_id = %report.batch_id, username, refund, "Refund target disappeared");
                report.refund_error = Some(format!("web user {username} not found"));
            }
            Err(e) => {
                error!(batch_id = %report.batch_id, username, refund, error = %e, "Refund failed");
                report.refund_error = Some(e.to_string());
            }
        }
    }
}
