//! Owner-only commands. The caller is identified by the `x-actor-id` header.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::AppState;
use crate::db::WebUser;
use crate::domain::{AccountId, AccountRecord, CurrencyKind};
use crate::error::AppError;
use crate::i18n::Message;
use crate::orchestration::{OrderReport, OrderRequest};

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The owner's id, or `Forbidden` for anyone else.
async fn require_owner(state: &AppState, headers: &HeaderMap) -> Result<AccountId, AppError> {
    let actor = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if actor == state.config.owner_id.as_str() {
        return Ok(state.config.owner_id.clone());
    }

    warn!(actor, "Admin command refused");
    let lang = if actor.is_empty() {
        Default::default()
    } else {
        state.economy.language_of(&AccountId::new(actor)).await
    };
    Err(AppError::Forbidden(lang))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    pub user_id: AccountId,
    pub kind: CurrencyKind,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditResponse {
    pub account: AccountRecord,
    pub message: String,
}

/// Mint currency into an account.
pub async fn credit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreditRequest>,
) -> Result<Json<CreditResponse>, AppError> {
    let owner = require_owner(&state, &headers).await?;
    let lang = state.economy.language_of(&owner).await;

    let account = state
        .economy
        .credit(&req.user_id, req.kind, req.amount)
        .await
        .map_err(|e| AppError::from_service(e, lang))?;

    Ok(Json(CreditResponse {
        message: Message::Credited {
            amount: req.amount,
            kind: req.kind,
            to: account.id.to_string(),
        }
        .render(lang),
        account,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebBalanceRequest {
    pub username: String,
    /// Signed adjustment; the balance may not drop below zero.
    pub delta: i64,
}

pub async fn adjust_web_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WebBalanceRequest>,
) -> Result<Json<WebUser>, AppError> {
    require_owner(&state, &headers).await?;

    let user = state
        .wallet
        .find_web_user(&req.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("web user {}", req.username)))?;

    if !state
        .wallet
        .adjust_web_balance(&req.username, req.delta)
        .await?
    {
        return Err(AppError::Unprocessable {
            code: "insufficient_web_balance",
            message: format!(
                "web user {} has {}, cannot apply {}",
                user.username, user.balance, req.delta
            ),
        });
    }

    info!(username = %req.username, delta = req.delta, "Web balance adjusted");
    let updated = state
        .wallet
        .find_web_user(&req.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("web user {}", req.username)))?;
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub report: OrderReport,
    pub message: String,
}

/// Place an agency package order, waiting for every package to settle.
pub async fn run_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let owner = require_owner(&state, &headers).await?;
    let lang = state.economy.language_of(&owner).await;

    let report = state.orders.run(&req).await?;
    Ok(Json(OrderResponse {
        message: Message::OrderFinished {
            succeeded: report.succeeded,
            requested: report.requested,
        }
        .render(lang),
        report,
    }))
}
