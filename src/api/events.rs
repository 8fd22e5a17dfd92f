use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::AppState;
use crate::domain::AccountId;
use crate::engine::TierLabel;
use crate::error::AppError;
use crate::i18n::Message;
use crate::roles::RoleSync;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub user_id: AccountId,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEventResponse {
    pub applied: bool,
    /// Absent for ignored bot messages, which never load an account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
    pub levels_gained: u32,
    /// Fund credited for each level gained, in order.
    pub rewards: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_tier: Option<TierLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleSync>,
    /// Direct messages to deliver to the member.
    pub notifications: Vec<String>,
}

/// Passive XP for one chat message.
pub async fn post_message(
    State(state): State<AppState>,
    Json(event): Json<MessageEvent>,
) -> Result<Json<MessageEventResponse>, AppError> {
    if event.user_id.as_str().trim().is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }

    if event.is_bot {
        debug!(account = %event.user_id, "Ignoring bot message");
        return Ok(Json(MessageEventResponse {
            applied: false,
            level: None,
            xp: None,
            levels_gained: 0,
            rewards: Vec::new(),
            new_tier: None,
            roles: None,
            notifications: Vec::new(),
        }));
    }

    let outcome = state
        .economy
        .record_message(&event.user_id, Utc::now())
        .await?;

    let record = &outcome.record;
    let grant = &outcome.grant;
    let lang = record.language;

    let first_new_level = record.level - grant.levels_gained + 1;
    let mut notifications: Vec<String> = grant
        .rewards
        .iter()
        .zip(first_new_level..)
        .map(|(reward, level)| {
            Message::LevelUp {
                level,
                reward: *reward,
            }
            .render(lang)
        })
        .collect();
    let new_tier = grant.new_tier().cloned();
    if let Some(tier) = &new_tier {
        notifications.push(Message::RankUp(tier.clone()).render(lang));
    }

    Ok(Json(MessageEventResponse {
        applied: grant.applied,
        level: Some(record.level),
        xp: Some(record.xp),
        levels_gained: grant.levels_gained,
        rewards: grant.rewards.clone(),
        new_tier,
        roles: outcome.roles.clone(),
        notifications,
    }))
}
