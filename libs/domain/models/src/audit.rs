// [libs/domain/models/src/audit.rs]
/*!
 * `AuditLog`: trazo append-only. Nunca leído por el núcleo de la
 * tubería de compra; existe únicamente para el rastro forense.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub verb: String,
    pub payload_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(user_id: Option<Uuid>, verb: impl Into<String>, payload_json: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            verb: verb.into(),
            payload_json,
            created_at: Utc::now(),
        }
    }
}
