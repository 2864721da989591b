// [libs/domain/models/src/purchase.rs]
/*!
 * `Purchase`: registro append-only de una compra comprometida con el
 * registrador. `order_id` es la ancla de unicidad de último recurso
 * cuando el mutex en proceso no puede serializar entre instancias.
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_id: Uuid,
    pub registrar: String,
    /// Unique across the system; the registrar's own order identifier
    /// (or a synthesized dry-run equivalent).
    pub order_id: String,
    pub years: u8,
    pub total_usd: Decimal,
    pub premium: bool,
    pub created_at: DateTime<Utc>,
}
