// [libs/domain/models/src/user.rs]
/*!
 * Entidades de identidad: el operador (User) y su credencial opaca (ApiKey).
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Un operador autenticable. Dueño de cero o más `ApiKey` y `Domain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Credencial bearer opaca vinculada a un `User`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub key: String,
    pub user_id: Uuid,
}
