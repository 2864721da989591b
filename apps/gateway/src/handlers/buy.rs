// [apps/gateway/src/handlers/buy.rs]
/*!
 * `/buy` (C7), el corazón transaccional del gateway. Cada fallo dentro
 * de la región protegida (desde que se adquiere el mutex hasta que se
 * compromete la respuesta) limpia el slot de idempotencia; ningún
 * fallo posterior a `commit` deshace lo ya comprometido.
 */

use crate::audit;
use crate::dns_templates;
use crate::errors::GatewayError;
use crate::middleware::Identity;
use crate::normalize::{normalize_domain, split_label_tld};
use crate::state::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use chrono::{Duration as ChronoDuration, Utc};
use gatewayrs_domain_idempotency::{begin, canonical_digest, commit, BeginOutcome, IdemStore};
use gatewayrs_domain_label_safety::classify_domain_label;
use gatewayrs_domain_models::DomainStatus;
use gatewayrs_domain_billing::{remaining, would_exceed, SpendLedgerStore};
use gatewayrs_infra_registrar::{RegisterRequest, RegistrarDriver, RegistrarError};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const IDEMPOTENCY_TTL_SECS: i64 = 3600;
const PRICE_DRIFT_TOLERANCE_USD: &str = "0.50";

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub domain: String,
    #[serde(default = "default_years")]
    pub years: u8,
    #[serde(default = "default_true")]
    pub whois_privacy: bool,
    #[serde(default)]
    pub allow_premium: bool,
    #[serde(default)]
    pub allow_unicode: bool,
    #[serde(default = "default_nameserver_mode")]
    pub nameserver_mode: String,
    pub nameservers: Option<Vec<String>>,
    pub dns_template_id: Option<String>,
    pub quoted_total_usd: Decimal,
    pub confirmation_code: String,
    pub idempotency_key: Uuid,
}

fn default_years() -> u8 {
    1
}
fn default_true() -> bool {
    true
}
fn default_nameserver_mode() -> String {
    "registrar".to_string()
}

pub async fn buy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<BuyRequest>,
) -> Result<Json<Value>, GatewayError> {
    // `require_auth` already rejected unauthenticated callers before this
    // handler runs; `user` is always `Some` here.
    let user = identity.user.expect("require_auth guarantees an authenticated user");
    let account_key = identity.account_key.clone();

    if req.confirmation_code.len() < 4 || req.confirmation_code.len() > 100 {
        return Err(GatewayError::ValidationError("confirmation_code must be 4..100 characters".to_string()));
    }
    if req.quoted_total_usd <= Decimal::ZERO {
        return Err(GatewayError::ValidationError("quoted_total_usd must be > 0".to_string()));
    }
    if req.nameserver_mode == "custom" {
        let ns_count = req.nameservers.as_ref().map(|v| v.len()).unwrap_or(0);
        if !(2..=13).contains(&ns_count) {
            return Err(GatewayError::NameserversRequired);
        }
    }

    // Step 1: normalize and TLD-allowlist the domain.
    let domain = normalize_domain(&req.domain).map_err(GatewayError::ValidationError)?;
    let (sld, tld) = split_label_tld(&domain);
    if !state.config.tld_allowed(tld) {
        return Err(GatewayError::ValidationError(format!("TLD '{tld}' is not allowlisted")));
    }

    // Step 2: label safety filter (C1).
    let verdict = classify_domain_label(sld, req.allow_unicode);
    if !verdict.safe {
        return Err(GatewayError::UnsafeLabel { reasons: verdict.reasons.iter().map(|r| format!("{r:?}")).collect() });
    }

    // Step 3: per-transaction cap.
    if req.quoted_total_usd > state.config.max_per_txn_usd {
        return Err(GatewayError::SpendCapExceeded { cap: state.config.max_per_txn_usd.to_string() });
    }

    // Step 4: provisional quote, premium gate.
    let provisional_quote = state.registrar.quote(&domain, req.years, req.whois_privacy).await?;
    if provisional_quote.premium && !req.allow_premium {
        return Err(GatewayError::PremiumNotAllowed);
    }

    // Step 5: daily cap.
    let today = Utc::now().date_naive();
    let today_spent = state.spend.get_total(&account_key, today).await?;
    if would_exceed(today_spent, req.quoted_total_usd, Some(state.config.max_daily_usd)) {
        let left = remaining(today_spent, Some(state.config.max_daily_usd));
        return Err(GatewayError::DailyCapExceeded { remaining: left.to_string() });
    }

    // Step 6: idempotency digest and key.
    let digest_body = json!({
        "domain": domain,
        "years": req.years,
        "whois_privacy": req.whois_privacy,
        "quoted_total_usd": req.quoted_total_usd.to_string(),
    });
    let digest = canonical_digest(&digest_body);
    let idem_key = format!("buy:{domain}:{}", req.idempotency_key);

    // Step 7: begin idempotency reservation.
    match begin(state.idem_store.as_ref(), &idem_key, &digest).await? {
        BeginOutcome::Replay(response) => return Ok(Json(response)),
        BeginOutcome::Conflict => return Err(GatewayError::IdempotencyMismatch),
        BeginOutcome::Start => {}
    }

    // Step 8: serialize concurrent attempts on this key, this instance.
    let _mutex_guard = state.purchase_mutex.acquire(&idem_key).await;

    // Step 9: guarded region. Any Err here clears the idempotency slot.
    let outcome = run_guarded_purchase(&state, &req, &domain, &account_key, user.id, today).await;

    match outcome {
        Ok(response) => {
            commit(state.idem_store.as_ref(), &idem_key, &digest, response.clone(), ChronoDuration::seconds(IDEMPOTENCY_TTL_SECS))
                .await?;
            audit::record(&state.audit, Some(user.id), "BUY_SUCCESS", response.clone()).await;
            Ok(Json(response))
        }
        Err(err) => {
            if let Err(fail_err) = state.idem_store.fail(&idem_key).await {
                tracing::warn!(error = %fail_err, "failed to clear idempotency slot after pipeline failure");
            }
            audit::record(
                &state.audit,
                Some(user.id),
                "BUY_FAIL",
                json!({ "error": format!("{err:?}"), "message": "purchase pipeline aborted" }),
            )
            .await;
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_guarded_purchase(
    state: &AppState,
    req: &BuyRequest,
    domain: &str,
    account_key: &str,
    user_id: Uuid,
    today: chrono::NaiveDate,
) -> Result<Value, GatewayError> {
    // Fresh quote, price-drift check.
    let fresh_quote = state.registrar.quote(domain, req.years, req.whois_privacy).await?;
    let drift = (fresh_quote.total_usd - req.quoted_total_usd).abs();
    let tolerance: Decimal = PRICE_DRIFT_TOLERANCE_USD.parse().expect("static tolerance parses");
    if drift > tolerance {
        return Err(GatewayError::PriceDrift { drift: drift.to_string() });
    }

    let register_result = state
        .registrar
        .register(RegisterRequest {
            domain: domain.to_string(),
            years: req.years,
            privacy: req.whois_privacy,
            contact: state.config.registrant_contact.clone(),
        })
        .await?;

    if !register_result.success {
        return Err(GatewayError::ValidationError(register_result.message));
    }

    let domain_row = state
        .domains
        .create_purchased(domain, user_id, state.registrar.name(), req.whois_privacy, true)
        .await?;

    state
        .purchases
        .insert(
            user_id,
            domain_row.id,
            state.registrar.name(),
            &register_result.order_id,
            req.years,
            register_result.charged_total_usd,
            fresh_quote.premium,
        )
        .await?;

    let dns_template_id = match req.nameserver_mode.as_str() {
        "custom" => {
            // Count already validated up front, before any core logic ran.
            let nameservers = req.nameservers.as_deref().unwrap_or(&[]);
            state.registrar.set_nameservers(domain, nameservers).await?;
            None
        }
        _ => {
            let template_id = req.dns_template_id.clone().unwrap_or_else(|| dns_templates::DEFAULT_TEMPLATE_ID.to_string());
            let records = dns_templates::lookup(&template_id).ok_or_else(|| GatewayError::UnknownDnsTemplate(template_id.clone()))?;
            apply_dns_records(state, domain, &records).await?;
            Some(template_id)
        }
    };

    state.domains.set_status(domain_row.id, DomainStatus::DnsApplied).await?;

    state.spend.add(account_key, today, register_result.charged_total_usd).await?;

    Ok(json!({
        "order_id": register_result.order_id,
        "charged_total_usd": register_result.charged_total_usd.to_string(),
        "registrar": state.registrar.name(),
        "nameserver_mode": req.nameserver_mode,
        "dns_template_id": dns_template_id,
        "domainId": domain_row.id,
    }))
}

async fn apply_dns_records(
    state: &AppState,
    domain: &str,
    records: &[gatewayrs_infra_registrar::DnsRecord],
) -> Result<(), RegistrarError> {
    state.registrar.apply_records(domain, records).await
}
