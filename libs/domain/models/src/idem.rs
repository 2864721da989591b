// [libs/domain/models/src/idem.rs]
/*!
 * `Idem`: fila durable de la escalera de idempotencia. Un `IdemRecord`
 * con `expires_at` no vencido implica una respuesta ya completada para
 * esa llave.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdemRecord {
    /// Format: `buy:{normalized-domain}:{client-idempotency-uuid}`.
    pub key: String,
    /// SHA-256 digest (hex) over the canonical request used to detect
    /// key reuse with a different intent.
    pub digest: String,
    pub response_json: serde_json::Value,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
