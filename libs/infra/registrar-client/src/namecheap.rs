// [libs/infra/registrar-client/src/namecheap.rs]
/*!
 * =================================================================
 * APARATO: NAMECHEAP XML/GET DRIVER (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: HABLA EL PROTOCOLO XML/GET DEL REGISTRADOR NAMECHEAP
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
use std::str::FromStr;
use tracing::instrument;

const ICANN_FEE_PER_YEAR_USD: &str = "0.18";

pub struct NamecheapConfig {
    pub api_user: String,
    pub api_key: String,
    pub username: String,
    pub client_ip: String,
    pub base_url: String,
}

pub struct NamecheapDriver {
    http: reqwest::Client,
    config: NamecheapConfig,
    pricing: PricingCache,
}

impl NamecheapDriver {
    pub fn new(config: NamecheapConfig) -> Self {
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

    fn base_params(&self) -> Vec<(String, String)> {
        vec![
            ("ApiUser".to_string(), self.config.api_user.clone()),
            ("ApiKey".to_string(), self.config.api_key.clone()),
            ("UserName".to_string(), self.config.username.clone()),
            ("ClientIp".to_string(), self.config.client_ip.clone()),
        ]
    }

    async fn call(&self, command: &str, extra: &[(String, String)]) -> Result<ApiResponse, RegistrarError> {
        let mut params = self.base_params();
        params.push(("Command".to_string(), command.to_string()));
        for (k, v) in extra {
            params.push((k.clone(), v.clone()));
        }

        let base_url = self.config.base_url.clone();
        let endpoint = command.to_string();
        let response_text = with_retry(&endpoint, |_attempt| {
            let params = params.clone();
            let base_url = base_url.clone();
            async move {
                let response = self
                    .http
                    .get(&base_url)
                    .query(&params)
                    .send()
                    .await
                    .map_err(RegistrarError::from)?;
                let status = response.status();
                if status.as_u16() == 429 || status.is_server_error() {
                    return Err(RegistrarError::HttpError { status: status.as_u16(), body: String::new() });
                }
                response.text().await.map_err(|e| RegistrarError::NetworkError(e.to_string()))
            }
        })
        .await?;

        let parsed: ApiResponse =
            quick_xml::de::from_str(&response_text).map_err(|e| RegistrarError::ParseError(e.to_string()))?;

        if parsed.status != "OK" {
            let message = parsed
                .errors
                .as_ref()
                .and_then(|e| e.error.first())
                .map(|e| e.text.clone())
                .unwrap_or_else(|| "unknown Namecheap API error".to_string());
            return Err(RegistrarError::ParseError(message));
        }

        Ok(parsed)
    }

    async fn tld_pricing(&self, tld: &str) -> Result<TldPricing, RegistrarError> {
        let now_ms = now_epoch_ms();
        if let Some(cached) = self.pricing.get(tld, now_ms) {
            return Ok(cached);
        }

        let response = self
            .call(
                "namecheap.users.getPricing",
                &params(&[("ProductType", "DOMAIN".to_string()), ("ProductCategory", tld.to_string())]),
            )
            .await?;

        let price = response
            .command_response
            .as_ref()
            .and_then(|c| c.user_get_pricing_result.as_ref())
            .and_then(|r| r.price.as_ref())
            .and_then(|p| Decimal::from_str(&p.price).ok())
            .unwrap_or(Decimal::ZERO);

        let pricing = TldPricing {
            price_usd: price,
            premium: false,
            privacy_price_usd: Decimal::new(299, 2),
            fetched_at_epoch_ms: now_ms,
        };
        self.pricing.put(tld, pricing.clone());
        Ok(pricing)
    }
}

/// Shorthand for building the `(String, String)` query pairs `call`
/// expects.
fn params(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
#[serde(rename = "ApiResponse")]
struct ApiResponse {
    #[serde(rename = "@Status")]
    status: String,
    #[serde(rename = "Errors")]
    errors: Option<Errors>,
    #[serde(rename = "CommandResponse")]
    command_response: Option<CommandResponse>,
}

#[derive(Debug, Deserialize)]
struct Errors {
    #[serde(rename = "Error", default)]
    error: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(rename = "DomainCheckResult")]
    domain_check_result: Option<DomainCheckResult>,
    #[serde(rename = "DomainCreateResult")]
    domain_create_result: Option<DomainCreateResult>,
    #[serde(rename = "DomainGetInfoResult")]
    domain_get_info_result: Option<DomainGetInfoResult>,
    #[serde(rename = "UserGetPricingResult")]
    user_get_pricing_result: Option<UserGetPricingResult>,
}

#[derive(Debug, Deserialize)]
struct DomainCheckResult {
    #[serde(rename = "@Domain")]
    domain: String,
    #[serde(rename = "@Available")]
    available: bool,
    #[serde(rename = "@IsPremiumName", default)]
    is_premium_name: bool,
    #[serde(rename = "@PremiumRegistrationPrice", default)]
    premium_registration_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DomainCreateResult {
    #[serde(rename = "@Registered")]
    registered: bool,
    #[serde(rename = "@OrderID")]
    order_id: String,
    #[serde(rename = "@ChargedAmount", default)]
    charged_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DomainGetInfoResult {
    #[serde(rename = "@Status", default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserGetPricingResult {
    #[serde(rename = "Price")]
    price: Option<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(rename = "@Price")]
    price: String,
}

#[async_trait]
impl RegistrarDriver for NamecheapDriver {
    fn name(&self) -> &'static str {
        "namecheap"
    }

    #[instrument(skip(self))]
    async fn check_one_availability(&self, domain: &str) -> Result<AvailabilityResult, RegistrarError> {
        let response = self
            .call("namecheap.domains.check", &params(&[("DomainList", domain.to_string())]))
            .await?;

        let result = response
            .command_response
            .and_then(|c| c.domain_check_result)
            .ok_or_else(|| RegistrarError::ParseError("missing DomainCheckResult".into()))?;

        let tld = extract_tld(domain).unwrap_or_default();
        let fallback = self.tld_pricing(tld).await.ok();

        let price = result
            .premium_registration_price
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .or_else(|| fallback.as_ref().map(|p| p.price_usd))
            .unwrap_or(Decimal::ZERO);

        Ok(AvailabilityResult {
            domain: result.domain,
            available: result.available,
            price_usd: price,
            premium: result.is_premium_name,
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
        let response = self
            .call(
                "namecheap.domains.create",
                &params(&[
                    ("DomainName", request.domain.clone()),
                    ("Years", request.years.to_string()),
                    ("AddFreeWhoisguard", if request.privacy { "yes".to_string() } else { "no".to_string() }),
                    ("RegistrantFirstName", request.contact.first_name.clone()),
                    ("RegistrantLastName", request.contact.last_name.clone()),
                    ("RegistrantEmailAddress", request.contact.email.clone()),
                ]),
            )
            .await?;

        let result = response
            .command_response
            .and_then(|c| c.domain_create_result)
            .ok_or_else(|| RegistrarError::ParseError("missing DomainCreateResult".into()))?;

        let charged = result
            .charged_amount
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .unwrap_or(Decimal::ZERO);

        Ok(RegisterResult {
            order_id: result.order_id,
            charged_total_usd: charged,
            success: result.registered,
            message: if result.registered { "registered".to_string() } else { "registration declined".to_string() },
        })
    }

    #[instrument(skip(self))]
    async fn status(&self, domain: &str) -> Result<StatusResult, RegistrarError> {
        let response = self
            .call("namecheap.domains.getinfo", &params(&[("DomainName", domain.to_string())]))
            .await?;

        let raw_status = response
            .command_response
            .and_then(|c| c.domain_get_info_result)
            .and_then(|r| r.status)
            .unwrap_or_default();

        let state = match raw_status.as_str() {
            "Active" => DomainState::Active,
            "Pending" => DomainState::Pending,
            "Expired" => DomainState::Expired,
            "" => DomainState::NotFound,
            _ => DomainState::Error,
        };

        Ok(StatusResult { state, details: raw_status })
    }

    #[instrument(skip(self, nameservers))]
    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<(), RegistrarError> {
        if !(2..=13).contains(&nameservers.len()) {
            return Err(RegistrarError::InvalidNameserverCount(nameservers.len()));
        }
        let (sld, tld) = domain.split_once('.').ok_or_else(|| RegistrarError::TldNotSupported(domain.to_string()))?;
        self.call(
            "namecheap.domains.dns.setCustom",
            &params(&[
                ("SLD", sld.to_string()),
                ("TLD", tld.to_string()),
                ("Nameservers", nameservers.join(",")),
            ]),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, records))]
    async fn apply_records(&self, domain: &str, records: &[DnsRecord]) -> Result<(), RegistrarError> {
        let (sld, tld) = domain.split_once('.').ok_or_else(|| RegistrarError::TldNotSupported(domain.to_string()))?;
        let requested = records.len();

        let mut host_params: Vec<(String, String)> = vec![("SLD".to_string(), sld.to_string()), ("TLD".to_string(), tld.to_string())];
        for (i, record) in records.iter().enumerate() {
            let n = i + 1;
            host_params.push((format!("HostName{n}"), record.name.clone()));
            host_params.push((format!("RecordType{n}"), format!("{:?}", record.record_type).to_uppercase()));
            host_params.push((format!("Address{n}"), record.value.clone()));
            host_params.push((format!("TTL{n}"), record.ttl.to_string()));
        }

        self.call("namecheap.domains.dns.setHosts", &host_params)
            .await
            .map_err(|e| RegistrarError::DnsApplyPartialFailure {
                applied: 0,
                requested,
                detail: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_domain_check_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ApiResponse Status="OK">
  <CommandResponse>
    <DomainCheckResult Domain="example.com" Available="true" IsPremiumName="false"/>
  </CommandResponse>
</ApiResponse>"#;
        let parsed: ApiResponse = quick_xml::de::from_str(xml).unwrap();
        let result = parsed.command_response.unwrap().domain_check_result.unwrap();
        assert_eq!(result.domain, "example.com");
        assert!(result.available);
        assert!(!result.is_premium_name);
    }

    #[test]
    fn parses_error_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ApiResponse Status="ERROR">
  <Errors>
    <Error Number="1011150">Domain name not available</Error>
  </Errors>
</ApiResponse>"#;
        let parsed: ApiResponse = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.status, "ERROR");
        assert_eq!(parsed.errors.unwrap().error[0].text, "Domain name not available");
    }

    #[test]
    fn params_helper_stringifies_pairs() {
        let out = params(&[("A", "1".to_string()), ("B", "2".to_string())]);
        assert_eq!(out, vec![("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())]);
    }
}
