// [apps/gateway/src/handlers/search.rs]
/*!
 * `/search` (C8). Acepta exactamente una de dos formas de entrada
 * -- una lista explícita de candidatos, o un prompt en lenguaje
 * natural del que se derivan candidatos -- y devuelve disponibilidad
 * real contra el registrador configurado.
 */

use crate::audit;
use crate::errors::GatewayError;
use crate::middleware::Identity;
use crate::normalize::{normalize_domain, split_label_tld};
use crate::state::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use gatewayrs_domain_label_safety::classify_domain_label;
use gatewayrs_infra_registrar::check_bulk_availability;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_TLDS: [&str; 4] = ["com", "net", "org", "io"];

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub prompt: Option<String>,
    pub candidates: Option<Vec<String>>,
    #[serde(default)]
    pub tlds: Option<Vec<String>>,
    pub price_ceiling: Option<Decimal>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub include_premium: bool,
    #[serde(default)]
    pub include_unicode: bool,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub domain: String,
    pub available: bool,
    pub premium: bool,
    pub price_usd: Decimal,
}

pub async fn search(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    match (&req.prompt, &req.candidates) {
        (Some(_), Some(_)) | (None, None) => {
            return Err(GatewayError::ValidationError(
                "exactly one of `prompt` or `candidates` must be provided".to_string(),
            ))
        }
        _ => {}
    }

    if let Some(prompt) = &req.prompt {
        if prompt.len() > 500 {
            return Err(GatewayError::ValidationError("prompt must be <= 500 characters".to_string()));
        }
    }
    if let Some(candidates) = &req.candidates {
        if candidates.is_empty() || candidates.len() > 20 {
            return Err(GatewayError::ValidationError("candidates must contain 1..20 entries".to_string()));
        }
    }
    if let Some(tlds) = &req.tlds {
        if tlds.is_empty() || tlds.len() > 10 || tlds.iter().any(|t| !t.chars().all(|c| c.is_ascii_alphabetic())) {
            return Err(GatewayError::ValidationError("tlds must contain 1..10 letters-only entries".to_string()));
        }
    }
    if req.limit > 50 {
        return Err(GatewayError::ValidationError("limit must be <= 50".to_string()));
    }

    // Step 1: resolve the TLD set to search over.
    let tlds: Vec<String> = match &req.tlds {
        Some(explicit) => explicit.iter().map(|t| t.to_lowercase()).collect(),
        None if !state.config.allowlist_tlds.is_empty() => state.config.allowlist_tlds.clone(),
        None => DEFAULT_TLDS.iter().map(|s| s.to_string()).collect(),
    };

    // Step 2: resolve the candidate domain set.
    let raw_candidates: Vec<String> = match &req.candidates {
        Some(list) => list.clone(),
        None => {
            let base = slugify(req.prompt.as_deref().unwrap_or_default());
            tlds.iter().map(|tld| format!("{base}.{tld}")).collect()
        }
    };

    let normalized: Vec<String> = raw_candidates
        .iter()
        .filter_map(|raw| normalize_domain(raw).ok())
        .collect();

    // Step 3: per-domain TLD allowlist check.
    let tld_allowed: Vec<String> = normalized
        .into_iter()
        .filter(|domain| {
            let (_, tld) = split_label_tld(domain);
            state.config.tld_allowed(tld)
        })
        .collect();

    if tld_allowed.is_empty() {
        return Err(GatewayError::ValidationError("no candidate domain has an allowlisted TLD".to_string()));
    }

    // Step 4: per-label safety filter (C1).
    let mut safe_candidates = Vec::new();
    let mut sample_reasons = Vec::new();
    for domain in &tld_allowed {
        let (sld, _) = split_label_tld(domain);
        let verdict = classify_domain_label(sld, req.include_unicode);
        if verdict.safe {
            safe_candidates.push(domain.clone());
        } else if sample_reasons.len() < 2 {
            sample_reasons.extend(verdict.reasons.iter().map(|r| format!("{r:?}")));
        }
    }

    if safe_candidates.is_empty() {
        sample_reasons.truncate(2);
        return Err(GatewayError::UnsafeLabel { reasons: sample_reasons });
    }

    // Step 5: availability, concurrency-capped inside the driver crate.
    let availability = check_bulk_availability(state.registrar.as_ref(), &safe_candidates).await;

    // Step 6: premium/price/limit filtering.
    let mut results: Vec<SearchResultItem> = availability
        .into_iter()
        .filter_map(|r| r.ok())
        .filter(|r| req.include_premium || !r.premium)
        .filter(|r| req.price_ceiling.map(|ceiling| r.price_usd <= ceiling).unwrap_or(true))
        .map(|r| SearchResultItem {
            domain: r.domain,
            available: r.available,
            premium: r.premium,
            price_usd: r.price_usd,
        })
        .collect();
    results.truncate(req.limit);

    // Step 7: audit, best-effort.
    let account_user_id = identity.as_ref().and_then(|Extension(i)| i.user.as_ref().map(|u| u.id));
    audit::record(
        &state.audit,
        account_user_id,
        "SEARCH",
        json!({ "prompt": req.prompt, "tlds": tlds, "count": results.len() }),
    )
    .await;

    Ok(Json(json!({ "results": results })))
}

/// Deriva una base de slug desde un prompt en lenguaje natural: pasa a
/// minúsculas, colapsa cualquier corrida de caracteres fuera de
/// `[a-z0-9]` en un solo guion, y recorta guiones en los extremos.
fn slugify(prompt: &str) -> String {
    let non_alnum: Regex = Regex::new(r"[^a-z0-9]+").expect("static regex is valid");
    let lowered = prompt.to_lowercase();
    non_alnum.replace_all(&lowered, "-").trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_runs_and_trims_hyphens() {
        assert_eq!(slugify("AI Chatbot!!"), "ai-chatbot");
        assert_eq!(slugify("  --weird--  "), "weird");
    }
}
