use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{AccountId, Faction};
use crate::engine::TierLabel;
use crate::error::AppError;

const LEADERBOARD_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub faction: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user: AccountId,
    pub level: u32,
    pub xp: u64,
    pub tier: Option<TierLabel>,
}

pub async fn get_leaderboard(
    Query(params): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let faction = params
        .faction
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("faction is required".to_string()))?;
    let faction = Faction::from_str(faction).map_err(|_| {
        AppError::BadRequest("faction must be one of: hero, monster".to_string())
    })?;

    let ranks = &state.economy.rules().ranks;
    let entries = state
        .economy
        .leaderboard(faction, LEADERBOARD_SIZE)
        .await?
        .into_iter()
        .zip(1..)
        .map(|(record, rank)| LeaderboardEntry {
            rank,
            tier: ranks.derive_tier(Some(faction), record.level).cloned(),
            user: record.id,
            level: record.level,
            xp: record.xp,
        })
        .collect();

    Ok(Json(entries))
}
