use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::engine::{project_tickets, TicketKind, TicketProjection};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CalcRequest {
    pub kind: TicketKind,
    pub current: u64,
    pub months: u32,
}

#[derive(Debug, Serialize)]
pub struct CalcResponse {
    pub kind: TicketKind,
    pub projections: Vec<TicketProjection>,
}

/// Voucher tickets expected over the coming months, starting next month.
pub async fn project(Json(req): Json<CalcRequest>) -> Result<Json<CalcResponse>, AppError> {
    let today = Utc::now().date_naive();
    let projections = project_tickets(req.kind, req.current, req.months, today)?;
    Ok(Json(CalcResponse {
        kind: req.kind,
        projections,
    }))
}
