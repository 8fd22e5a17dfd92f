use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{AccountId, AccountRecord, Faction, Language};
use crate::error::AppError;
use crate::i18n::Message;
use crate::orchestration::Profile;
use crate::roles::RoleSync;

pub async fn get_profile(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Profile>, AppError> {
    let profile = state.economy.profile(&AccountId::new(id)).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account: AccountRecord,
    pub message: String,
}

pub async fn set_language(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<LanguageRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .economy
        .set_language(&AccountId::new(id), req.language)
        .await
        .map_err(|e| AppError::from_service(e, req.language))?;

    Ok(Json(AccountResponse {
        message: Message::LanguageChanged.render(account.language),
        account,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactionAction {
    #[default]
    Join,
    Leave,
}

#[derive(Debug, Deserialize)]
pub struct FactionRequest {
    pub faction: Faction,
    #[serde(default)]
    pub action: FactionAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionResponse {
    pub account: AccountRecord,
    pub changed: bool,
    /// Roles the adapter should reconcile on the platform.
    pub roles: RoleSync,
    pub message: String,
}

/// Join or leave a faction. Joining one faction leaves the other.
pub async fn set_faction(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<FactionRequest>,
) -> Result<Json<FactionResponse>, AppError> {
    let id = AccountId::new(id);
    let change = match req.action {
        FactionAction::Join => state.economy.join_faction(&id, req.faction).await?,
        FactionAction::Leave => state.economy.leave_faction(&id, req.faction).await?,
    };

    let message = match (change.changed, req.action) {
        (false, _) => Message::FactionUnchanged,
        (true, FactionAction::Join) => Message::FactionJoined(req.faction),
        (true, FactionAction::Leave) => Message::FactionLeft(req.faction),
    };

    Ok(Json(FactionResponse {
        message: message.render(change.record.language),
        account: change.record,
        changed: change.changed,
        roles: change.roles,
    }))
}
