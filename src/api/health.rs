use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::domain::Faction;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the ledger store answers a query.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.economy.leaderboard(Faction::Hero, 1).await?;
    Ok(Json(serde_json::json!({"status": "ready"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
