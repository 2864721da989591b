// [libs/domain/models/src/spend.rs]
/*!
 * `DailySpend`: acumulador monotónico por (cuenta, día-UTC).
 */

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySpend {
    pub account_key: String,
    /// Midnight UTC, stored as a bare date.
    pub day: NaiveDate,
    pub total_usd: Decimal,
}
