// [libs/infra/registrar-client/src/porkbun.rs]
/*!
 * =================================================================
 * APARATO: PORKBUN JSON/POST DRIVER (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: HABLA EL PROTOCOLO JSON/POST DEL REGISTRADOR PORKBUN
 *
 * El modo dry-run (por defecto ON salvo `dry_run=false` exacto) impide
 * que `register`, `set_nameservers` y `apply_records` emitan la llamada
 * mutante; devuelven éxito sintetizado con un order id prefijado
 * `PB-DRYRUN-` para que nunca se confunda con una orden real.
 * =================================================================
 */

use crate::driver::RegistrarDriver;
use crate::errors::RegistrarError;
use crate::pricing_cache::PricingCache;
use crate::retry::with_retry;
use crate::tld::extract_tld;
use crate::types::{
    AvailabilityResult, DnsRecord, DomainState, Quote, RegisterRequest, RegisterResult, StatusResult, TldPricing,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{info, instrument};

const ICANN_FEE_PER_YEAR_USD: &str = "0.18";

pub struct PorkbunConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub dry_run: bool,
}

pub struct PorkbunDriver {
    http: reqwest::Client,
    config: PorkbunConfig,
    pricing: PricingCache,
}

impl PorkbunDriver {
    pub fn new(config: PorkbunConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .user_agent("gatewayrs-domain-gateway/1.0")
                .build()
                .expect("reqwest client must build"),
            config,
            pricing: PricingCache::new(),
        }
    }

    fn auth_body(&self) -> serde_json::Value {
        json!({ "apikey": self.config.api_key, "secretapikey": self.config.secret_key })
    }

    async fn post_json(&self, path: &str, mut body: serde_json::Value) -> Result<serde_json::Value, RegistrarError> {
        let url = format!("{}{}", self.config.base_url, path);
        let auth = self.auth_body();
        if let (Some(map), Some(auth_map)) = (body.as_object_mut(), auth.as_object()) {
            for (k, v) in auth_map {
                map.insert(k.clone(), v.clone());
            }
        }

        with_retry(path, |_attempt| {
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = self.http.post(&url).json(&body).send().await.map_err(RegistrarError::from)?;
                let status = response.status();
                if status.as_u16() == 429 || status.is_server_error() {
                    return Err(RegistrarError::HttpError { status: status.as_u16(), body: String::new() });
                }
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(RegistrarError::HttpError { status: status.as_u16(), body: text });
                }
                response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| RegistrarError::ParseError(e.to_string()))
            }
        })
        .await
    }

    async fn tld_pricing(&self, tld: &str) -> Result<TldPricing, RegistrarError> {
        let now_ms = now_epoch_ms();
        if let Some(cached) = self.pricing.get(tld, now_ms) {
            return Ok(cached);
        }

        let body = self.post_json("/pricing/get", json!({})).await?;
        let pricing_map = body
            .get("pricing")
            .and_then(|v| v.as_object())
            .ok_or_else(|| RegistrarError::ParseError("missing pricing object".into()))?;

        for (entry_tld, entry) in pricing_map {
            let price = entry
                .get("registration")
                .and_then(|v| v.as_str())
                .and_then(|s| Decimal::from_str(s).ok())
                .unwrap_or(Decimal::ZERO);
            let premium = entry.get("premium").and_then(|v| v.as_str()).map(|s| s == "yes").unwrap_or(false);
            self.pricing.put(
                entry_tld,
                TldPricing {
                    price_usd: price,
                    premium,
                    privacy_price_usd: Decimal::new(299, 2),
                    fetched_at_epoch_ms: now_ms,
                },
            );
        }

        self.pricing
            .get(tld, now_ms)
            .ok_or_else(|| RegistrarError::TldNotSupported(tld.to_string()))
    }
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Deserialize)]
struct CheckDomainResponse {
    response: CheckDomainInner,
}

#[derive(Deserialize)]
struct CheckDomainInner {
    avail: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    premium: Option<String>,
}

#[async_trait]
impl RegistrarDriver for PorkbunDriver {
    fn name(&self) -> &'static str {
        "porkbun"
    }

    #[instrument(skip(self))]
    async fn check_one_availability(&self, domain: &str) -> Result<AvailabilityResult, RegistrarError> {
        let body = self
            .post_json(&format!("/domain/checkDomain/{domain}"), json!({}))
            .await?;
        let parsed: CheckDomainResponse =
            serde_json::from_value(body).map_err(|e| RegistrarError::ParseError(e.to_string()))?;

        let tld = extract_tld(domain).unwrap_or_default();
        let fallback_pricing = self.tld_pricing(tld).await.ok();

        let price = parsed
            .response
            .price
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .or_else(|| fallback_pricing.as_ref().map(|p| p.price_usd))
            .unwrap_or(Decimal::ZERO);

        let premium = parsed
            .response
            .premium
            .as_deref()
            .map(|s| s == "yes")
            .or_else(|| fallback_pricing.as_ref().map(|p| p.premium))
            .unwrap_or(false);

        Ok(AvailabilityResult {
            domain: domain.to_string(),
            available: parsed.response.avail == "yes",
            price_usd: price,
            premium,
        })
    }

    #[instrument(skip(self))]
    async fn quote(&self, domain: &str, years: u8, privacy: bool) -> Result<Quote, RegistrarError> {
        let tld = extract_tld(domain).ok_or_else(|| RegistrarError::TldNotSupported(domain.to_string()))?;
        let pricing = self.tld_pricing(tld).await?;
        let icann_fee = Decimal::from_str(ICANN_FEE_PER_YEAR_USD).expect("constant parses");
        Ok(crate::driver::compute_quote(
            pricing.price_usd,
            icann_fee,
            pricing.privacy_price_usd,
            years,
            privacy,
            pricing.premium,
        ))
    }

    #[instrument(skip(self, request))]
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResult, RegistrarError> {
        if self.config.dry_run {
            info!(domain = %request.domain, "🧪 [DRY_RUN]: synthesizing registration, no mutating call issued");
            let quote = self.quote(&request.domain, request.years, request.privacy).await?;
            return Ok(RegisterResult {
                order_id: format!("PB-DRYRUN-{}", uuid::Uuid::new_v4()),
                charged_total_usd: quote.total_usd,
                success: true,
                message: "dry run: no registrar call issued".to_string(),
            });
        }

        let body = self
            .post_json(
                "/domain/create",
                json!({
                    "domain": request.domain,
                    "years": request.years,
                    "whois_privacy": request.privacy,
                    "contact": request.contact,
                }),
            )
            .await?;

        let order_id = body
            .get("response")
            .and_then(|v| v.get("order_id"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let charged = body
            .get("response")
            .and_then(|v| v.get("charged_total"))
            .and_then(|v| v.as_str())
            .and_then(|s| Decimal::from_str(s).ok())
            .unwrap_or(Decimal::ZERO);

        Ok(RegisterResult {
            order_id,
            charged_total_usd: charged,
            success: body.get("status").and_then(|v| v.as_str()) == Some("SUCCESS"),
            message: body.get("message").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn status(&self, domain: &str) -> Result<StatusResult, RegistrarError> {
        let body = self.post_json(&format!("/domain/status/{domain}"), json!({})).await?;
        let raw_state = body.get("response").and_then(|v| v.get("status")).and_then(|v| v.as_str()).unwrap_or("");

        let state = match raw_state {
            "ACTIVE" => DomainState::Active,
            "PENDING" => DomainState::Pending,
            "EXPIRED" => DomainState::Expired,
            "" if body.get("status").and_then(|v| v.as_str()) == Some("ERROR") => DomainState::NotFound,
            _ => DomainState::Error,
        };

        Ok(StatusResult {
            state,
            details: raw_state.to_string(),
        })
    }

    #[instrument(skip(self, nameservers))]
    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<(), RegistrarError> {
        if !(2..=13).contains(&nameservers.len()) {
            return Err(RegistrarError::InvalidNameserverCount(nameservers.len()));
        }
        if self.config.dry_run {
            info!(domain, "🧪 [DRY_RUN]: skipping setNameservers call");
            return Ok(());
        }
        self.post_json(
            &format!("/domain/updateNs/{domain}"),
            json!({ "ns": nameservers }),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, records))]
    async fn apply_records(&self, domain: &str, records: &[DnsRecord]) -> Result<(), RegistrarError> {
        if self.config.dry_run {
            info!(domain, count = records.len(), "🧪 [DRY_RUN]: skipping applyRecords call");
            return Ok(());
        }

        let requested = records.len();
        for (applied, record) in records.iter().enumerate() {
            let result = self
                .post_json(
                    &format!("/dns/create/{domain}"),
                    json!({
                        "type": format!("{:?}", record.record_type).to_uppercase(),
                        "name": record.name,
                        "content": record.value,
                        "ttl": record.ttl,
                        "prio": record.prio,
                    }),
                )
                .await;

            if let Err(e) = result {
                return Err(RegistrarError::DnsApplyPartialFailure {
                    applied,
                    requested,
                    detail: e.to_string(),
                });
            }
        }
        Ok(())
    }
}
