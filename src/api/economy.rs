use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{AccountId, AccountRecord, CurrencyKind};
use crate::engine::{DailyReward, WagerOutcome};
use crate::error::AppError;
use crate::i18n::Message;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub user_id: AccountId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    pub account: AccountRecord,
    pub reward: DailyReward,
    pub message: String,
}

pub async fn claim_daily(
    State(state): State<AppState>,
    Json(req): Json<AccountRequest>,
) -> Result<Json<DailyResponse>, AppError> {
    let lang = state.economy.language_of(&req.user_id).await;
    let (account, reward) = state
        .economy
        .claim_daily(&req.user_id, Utc::now())
        .await
        .map_err(|e| AppError::from_service(e, lang))?;

    Ok(Json(DailyResponse {
        message: Message::DailyClaimed {
            fund: reward.fund,
            coupon: reward.coupon,
        }
        .render(lang),
        account,
        reward,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub user_id: AccountId,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub account: AccountRecord,
    pub message: String,
}

/// Convert coupon into fund one to one.
pub async fn exchange(
    State(state): State<AppState>,
    Json(req): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, AppError> {
    let lang = state.economy.language_of(&req.user_id).await;
    let account = state
        .economy
        .exchange(&req.user_id, req.amount)
        .await
        .map_err(|e| AppError::from_service(e, lang))?;

    Ok(Json(ExchangeResponse {
        account,
        message: Message::Exchanged { amount: req.amount }.render(lang),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    pub kind: CurrencyKind,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub sender: AccountRecord,
    pub receiver: AccountRecord,
    pub message: String,
}

pub async fn transfer(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let lang = state.economy.language_of(&req.sender_id).await;
    let (sender, receiver) = state
        .economy
        .transfer(&req.sender_id, &req.receiver_id, req.kind, req.amount)
        .await
        .map_err(|e| AppError::from_service(e, lang))?;

    Ok(Json(TransferResponse {
        message: Message::Transferred {
            amount: req.amount,
            kind: req.kind,
            to: receiver.id.to_string(),
        }
        .render(lang),
        sender,
        receiver,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerRequest {
    pub user_id: AccountId,
    pub kind: CurrencyKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerResponse {
    pub outcome: WagerOutcome,
    pub message: String,
}

pub async fn wager(
    State(state): State<AppState>,
    Json(req): Json<WagerRequest>,
) -> Result<Json<WagerResponse>, AppError> {
    let lang = state.economy.language_of(&req.user_id).await;
    let outcome = state
        .economy
        .wager(&req.user_id, req.kind)
        .await
        .map_err(|e| AppError::from_service(e, lang))?;

    let message = if outcome.won {
        Message::WagerWon {
            multiplier: outcome.multiplier(),
            stake: outcome.stake,
        }
    } else {
        Message::WagerLost {
            stake: outcome.stake,
        }
    };

    Ok(Json(WagerResponse {
        message: message.render(lang),
        outcome,
    }))
}
