// [libs/infra/registrar-client/src/lib.rs]
/*!
 * =================================================================
 * CRATE: GATEWAYRS-INFRA-REGISTRAR
 * RESPONSABILIDAD: ADAPTADORES CONCRETOS DEL CONTRATO REGISTRADOR (C5)
 *
 * Expone un único trait (`RegistrarDriver`) con dos implementaciones
 * -- Porkbun (JSON/POST) y Namecheap (XML/GET) -- seleccionadas en
 * tiempo de arranque según configuración, nunca en tiempo de llamada.
 * =================================================================
 */

pub mod driver;
pub mod errors;
pub mod namecheap;
pub mod porkbun;
pub mod pricing_cache;
pub mod retry;
pub mod tld;
pub mod types;

pub use driver::{check_bulk_availability, compute_quote, RegistrarDriver, BULK_AVAILABILITY_CONCURRENCY};
pub use errors::RegistrarError;
pub use namecheap::{NamecheapConfig, NamecheapDriver};
pub use porkbun::{PorkbunConfig, PorkbunDriver};
pub use types::{
    AvailabilityResult, DnsRecord, DomainState, Quote, RecordType, RegisterRequest, RegisterResult, RegistrantContact,
    StatusResult, TldPricing,
};

/// Configuración mínima requerida para construir cualquiera de los
/// dos drivers concretos; los campos que no aplican al driver elegido
/// se ignoran.
pub struct DriverConfig {
    pub provider: String,
    pub porkbun_api_key: Option<String>,
    pub porkbun_secret_key: Option<String>,
    pub porkbun_base_url: String,
    pub namecheap_api_user: Option<String>,
    pub namecheap_api_key: Option<String>,
    pub namecheap_username: Option<String>,
    pub namecheap_client_ip: Option<String>,
    pub namecheap_base_url: String,
    pub dry_run: bool,
}

/// Construye el driver concreto indicado por `config.provider`
/// (`"porkbun"` o `"namecheap"`). El dry-run sólo aplica al driver
/// Porkbun; Namecheap no lo soporta.
pub fn build_driver(config: &DriverConfig) -> Result<Box<dyn RegistrarDriver>, String> {
    match config.provider.as_str() {
        "porkbun" => {
            let api_key = config.porkbun_api_key.clone().ok_or("PORKBUN_API_KEY is required")?;
            let secret_key = config.porkbun_secret_key.clone().ok_or("PORKBUN_SECRET_KEY is required")?;
            Ok(Box::new(PorkbunDriver::new(PorkbunConfig {
                api_key,
                secret_key,
                base_url: config.porkbun_base_url.clone(),
                dry_run: config.dry_run,
            })))
        }
        "namecheap" => {
            let api_user = config.namecheap_api_user.clone().ok_or("NAMECHEAP_API_USER is required")?;
            let api_key = config.namecheap_api_key.clone().ok_or("NAMECHEAP_API_KEY is required")?;
            let username = config.namecheap_username.clone().ok_or("NAMECHEAP_USERNAME is required")?;
            let client_ip = config.namecheap_client_ip.clone().ok_or("NAMECHEAP_CLIENT_IP is required")?;
            Ok(Box::new(NamecheapDriver::new(NamecheapConfig {
                api_user,
                api_key,
                username,
                client_ip,
                base_url: config.namecheap_base_url.clone(),
            })))
        }
        other => Err(format!("unknown registrar provider: {other}")),
    }
}
