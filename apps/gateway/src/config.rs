// [apps/gateway/src/config.rs]
/*!
 * Configuración de arranque. Todo lo que el proceso necesita para
 * decidir qué registrador hablar, qué techos de gasto respetar y qué
 * puerto escuchar vive en variables de entorno, leídas una sola vez
 * aquí y congeladas en `AppConfig` para el resto de la vida del
 * proceso.
 *
 * Una variable mal formada es un fallo de arranque, nunca uno en
 * caliente: `AppConfig::from_env` devuelve `Err` y `main` sale con
 * código 1 antes de abrir ningún socket.
 */

use gatewayrs_infra_registrar::RegistrantContact;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub turso_auth_token: Option<String>,

    pub default_provider: String,
    pub dry_run: bool,

    pub porkbun_api_key: Option<String>,
    pub porkbun_secret_key: Option<String>,
    pub namecheap_api_user: Option<String>,
    pub namecheap_api_key: Option<String>,
    pub namecheap_username: Option<String>,
    pub namecheap_client_ip: Option<String>,

    /// TLDs permitidos, sin el punto, en minúsculas. Vacío significa sin
    /// restricción.
    pub allowlist_tlds: Vec<String>,
    pub max_per_txn_usd: Decimal,
    pub max_daily_usd: Decimal,

    pub rate_limit_rpm: u32,
    pub rate_limit_burst: u32,

    pub max_domains_per_search: usize,

    pub registrant_contact: RegistrantContact,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let port = parse_or_default("PORT", 3000)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is required".to_string())?;
        let turso_auth_token = env::var("TURSO_AUTH_TOKEN").ok().filter(|s| !s.is_empty());

        let default_provider = env::var("DEFAULT_PROVIDER").unwrap_or_else(|_| "porkbun".to_string());
        if default_provider != "porkbun" && default_provider != "namecheap" {
            return Err(format!("DEFAULT_PROVIDER must be 'porkbun' or 'namecheap', got '{default_provider}'"));
        }

        // Dry-run ON by default; only an exact "false" turns it off.
        let dry_run = env::var("DRY_RUN").map(|v| v != "false").unwrap_or(true);

        let allowlist_tlds: Vec<String> = env::var("ALLOWLIST_TLDS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_per_txn_usd = parse_decimal_or_default("MAX_PER_TXN_USD", "1000")?;
        let max_daily_usd = parse_decimal_or_default("MAX_DAILY_USD", "5000")?;
        if max_daily_usd < max_per_txn_usd {
            return Err("MAX_DAILY_USD must be >= MAX_PER_TXN_USD".to_string());
        }

        let rate_limit_rpm = parse_or_default("RATE_LIMIT_RPM", 60)?;
        let rate_limit_burst = parse_or_default("RATE_LIMIT_BURST", 30)?;
        let max_domains_per_search = parse_or_default("MAX_DOMAINS_PER_SEARCH", 20usize)?;

        Ok(Self {
            port,
            database_url,
            turso_auth_token,
            default_provider,
            dry_run,
            porkbun_api_key: env::var("PORKBUN_API_KEY").ok().filter(|s| !s.is_empty()),
            porkbun_secret_key: env::var("PORKBUN_SECRET_KEY").ok().filter(|s| !s.is_empty()),
            namecheap_api_user: env::var("NAMECHEAP_API_USER").ok().filter(|s| !s.is_empty()),
            namecheap_api_key: env::var("NAMECHEAP_API_KEY").ok().filter(|s| !s.is_empty()),
            namecheap_username: env::var("NAMECHEAP_USERNAME").ok().filter(|s| !s.is_empty()),
            namecheap_client_ip: env::var("NAMECHEAP_CLIENT_IP").ok().filter(|s| !s.is_empty()),
            allowlist_tlds,
            max_per_txn_usd,
            max_daily_usd,
            rate_limit_rpm,
            rate_limit_burst,
            max_domains_per_search,
            registrant_contact: RegistrantContact {
                first_name: env::var("WINSTON_CONTACT_FIRST_NAME").unwrap_or_default(),
                last_name: env::var("WINSTON_CONTACT_LAST_NAME").unwrap_or_default(),
                email: env::var("WINSTON_CONTACT_EMAIL").unwrap_or_default(),
                phone: env::var("WINSTON_CONTACT_PHONE").unwrap_or_default(),
                address1: env::var("WINSTON_CONTACT_ADDRESS1").unwrap_or_default(),
                city: env::var("WINSTON_CONTACT_CITY").unwrap_or_default(),
                state_province: env::var("WINSTON_CONTACT_STATE").unwrap_or_default(),
                postal_code: env::var("WINSTON_CONTACT_POSTAL_CODE").unwrap_or_default(),
                country_code: env::var("WINSTON_CONTACT_COUNTRY").unwrap_or_default(),
            },
        })
    }

    /// `true` si `tld` (sin punto, ya en minúsculas) está permitido. Una
    /// allowlist vacía permite cualquier TLD.
    pub fn tld_allowed(&self, tld: &str) -> bool {
        self.allowlist_tlds.is_empty() || self.allowlist_tlds.iter().any(|t| t == tld)
    }

    pub fn registrar_driver_config(&self) -> gatewayrs_infra_registrar::DriverConfig {
        gatewayrs_infra_registrar::DriverConfig {
            provider: self.default_provider.clone(),
            porkbun_api_key: self.porkbun_api_key.clone(),
            porkbun_secret_key: self.porkbun_secret_key.clone(),
            porkbun_base_url: "https://porkbun.com/api/json/v3".to_string(),
            namecheap_api_user: self.namecheap_api_user.clone(),
            namecheap_api_key: self.namecheap_api_key.clone(),
            namecheap_username: self.namecheap_username.clone(),
            namecheap_client_ip: self.namecheap_client_ip.clone(),
            namecheap_base_url: "https://api.namecheap.com/xml.response".to_string(),
            dry_run: self.dry_run,
        }
    }
}

fn parse_or_default<T: FromStr>(var: &str, default: T) -> Result<T, String> {
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| format!("{var} is not a valid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_decimal_or_default(var: &str, default: &str) -> Result<Decimal, String> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(&raw).map_err(|_| format!("{var} is not a valid decimal: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tld_allowed_with_empty_allowlist_permits_everything() {
        let cfg = AppConfig {
            allowlist_tlds: Vec::new(),
            ..test_config()
        };
        assert!(cfg.tld_allowed("zz"));
    }

    #[test]
    fn tld_allowed_checks_membership() {
        let cfg = AppConfig {
            allowlist_tlds: vec!["com".to_string(), "io".to_string()],
            ..test_config()
        };
        assert!(cfg.tld_allowed("com"));
        assert!(!cfg.tld_allowed("net"));
    }

    fn test_config() -> AppConfig {
        AppConfig {
            port: 3000,
            database_url: ":memory:".to_string(),
            turso_auth_token: None,
            default_provider: "porkbun".to_string(),
            dry_run: true,
            porkbun_api_key: None,
            porkbun_secret_key: None,
            namecheap_api_user: None,
            namecheap_api_key: None,
            namecheap_username: None,
            namecheap_client_ip: None,
            allowlist_tlds: Vec::new(),
            max_per_txn_usd: Decimal::from(1000),
            max_daily_usd: Decimal::from(5000),
            rate_limit_rpm: 60,
            rate_limit_burst: 30,
            max_domains_per_search: 20,
            registrant_contact: RegistrantContact::default(),
        }
    }
}
