// [libs/domain/models/src/domain.rs]
/*!
 * La entidad `Domain`: una zona de nombre cuya titularidad es globalmente
 * exclusiva una vez registrada.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proyección de estado de un nombre de dominio dentro de este sistema.
///
/// No es autoridad de titularidad: el registrador es la fuente de verdad
/// fuera de este proceso. `status` aquí refleja sólo lo que esta pasarela
/// ha observado y persistido.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    Available,
    Purchased,
    DnsApplied,
    Error,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Available => "available",
            DomainStatus::Purchased => "purchased",
            DomainStatus::DnsApplied => "dns_applied",
            DomainStatus::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "purchased" => DomainStatus::Purchased,
            "dns_applied" => DomainStatus::DnsApplied,
            "error" => DomainStatus::Error,
            _ => DomainStatus::Available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    /// Fully lowercased, trimmed, TLD-allowlisted name. Globally unique.
    pub name: String,
    pub user_id: Uuid,
    pub registrar: String,
    pub status: DomainStatus,
    pub privacy: bool,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
