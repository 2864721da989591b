// [apps/gateway/src/handlers/status.rs]
/*!
 * `/status/:domain` (C9). Nunca muta estado; una simple proyección de
 * lo que esta pasarela sabe sobre el dominio, o `"unknown"` si nunca
 * lo vio.
 */

use crate::errors::GatewayError;
use crate::normalize::{normalize_domain, split_label_tld};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use gatewayrs_domain_models::DomainStatus;
use serde_json::json;

pub async fn status(State(state): State<AppState>, Path(raw_domain): Path<String>) -> Result<Json<serde_json::Value>, GatewayError> {
    let domain = normalize_domain(&raw_domain).map_err(GatewayError::ValidationError)?;
    let (_, tld) = split_label_tld(&domain);
    if !state.config.tld_allowed(tld) {
        return Err(GatewayError::ValidationError(format!("TLD '{tld}' is not allowlisted")));
    }

    let found = state.domains.find_by_name(&domain).await?;

    let Some(record) = found else {
        return Ok(Json(json!({
            "domain": domain,
            "state": "unknown",
            "details": { "message": "no purchase on record for this domain" },
        })));
    };

    let mapped_state = match record.status {
        DomainStatus::Purchased => "purchased",
        DomainStatus::DnsApplied => "dns_applied",
        DomainStatus::Error => "error",
        DomainStatus::Available => "unknown",
    };

    Ok(Json(json!({
        "domain": domain,
        "state": mapped_state,
        "registrar": record.registrar,
        "updatedAt": record.updated_at.to_rfc3339(),
    })))
}
