//! Future voucher-ticket projection.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PROJECTION_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketKind {
    Black,
    Relic,
}

impl TicketKind {
    /// Tickets earned per month.
    pub fn per_month(&self) -> u64 {
        match self {
            TicketKind::Black => 81,
            TicketKind::Relic => 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("months must be between 1 and 12, got {0}")]
    MonthsOutOfRange(u32),
}

/// Projected ticket count at the start of a future month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketProjection {
    pub month: u32,
    pub year: i32,
    pub total: u64,
}

/// Ticket totals for each of the `months` months following `from`.
pub fn project_tickets(
    kind: TicketKind,
    current: u64,
    months: u32,
    from: NaiveDate,
) -> Result<Vec<TicketProjection>, ProjectionError> {
    if !(1..=MAX_PROJECTION_MONTHS).contains(&months) {
        return Err(ProjectionError::MonthsOutOfRange(months));
    }

    let base = from.month0() as i32;
    Ok((1..=months)
        .map(|i| {
            let raw = base + i as i32;
            TicketProjection {
                month: (raw % 12) as u32 + 1,
                year: from.year() + raw / 12,
                total: current.saturating_add(kind.per_month() * u64::from(i)),
            }
        })
        .collect())
}
