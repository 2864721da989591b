// [libs/infra/registrar-client/src/types.rs]
/*!
 * Tipos de transporte del driver de registrador, compartidos por ambas
 * implementaciones concretas (JSON/POST y XML/GET).
 */

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub domain: String,
    pub available: bool,
    pub price_usd: Decimal,
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub registration_price_usd: Decimal,
    pub icann_fee_usd: Decimal,
    pub privacy_price_usd: Decimal,
    pub total_usd: Decimal,
    pub premium: bool,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub domain: String,
    pub years: u8,
    pub privacy: bool,
    pub contact: RegistrantContact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrantContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResult {
    pub order_id: String,
    pub charged_total_usd: Decimal,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    Active,
    Pending,
    Expired,
    NotFound,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub state: DomainState,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Txt,
    Mx,
    Ns,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub value: String,
    pub ttl: u32,
    #[serde(default)]
    pub prio: Option<u16>,
}

/// Entrada cacheada de precio por TLD; `timestamp` es epoch-ms para
/// evitar tomar una dependencia de reloj monotónico aquí.
#[derive(Debug, Clone)]
pub struct TldPricing {
    pub price_usd: Decimal,
    pub premium: bool,
    pub privacy_price_usd: Decimal,
    pub fetched_at_epoch_ms: i64,
}
