// [libs/infra/registrar-client/src/driver.rs]
/*!
 * Contrato polimórfico sobre el que la tubería de compra (C7) y la de
 * búsqueda (C8) operan, sin conocer si el registrador concreto habla
 * JSON/POST o XML/GET.
 */

use crate::errors::RegistrarError;
use crate::types::{AvailabilityResult, DnsRecord, Quote, RegisterRequest, RegisterResult, StatusResult};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// Tope de concurrencia para ráfagas de `checkAvailability`.
pub const BULK_AVAILABILITY_CONCURRENCY: usize = 5;

#[async_trait]
pub trait RegistrarDriver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check_one_availability(&self, domain: &str) -> Result<AvailabilityResult, RegistrarError>;

    async fn quote(&self, domain: &str, years: u8, privacy: bool) -> Result<Quote, RegistrarError>;

    async fn register(&self, request: RegisterRequest) -> Result<RegisterResult, RegistrarError>;

    async fn status(&self, domain: &str) -> Result<StatusResult, RegistrarError>;

    /// `nameservers.len()` must be validated by the caller to be in
    /// `2..=13` before invoking this; drivers assume it already holds.
    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<(), RegistrarError>;

    async fn apply_records(&self, domain: &str, records: &[DnsRecord]) -> Result<(), RegistrarError>;
}

/// Revisa disponibilidad para un lote de dominios con concurrencia
/// acotada a `BULK_AVAILABILITY_CONCURRENCY`. El orden relativo de los
/// resultados no está garantizado.
pub async fn check_bulk_availability(
    driver: &dyn RegistrarDriver,
    domains: &[String],
) -> Vec<Result<AvailabilityResult, RegistrarError>> {
    stream::iter(domains.iter())
        .map(|domain| async move { driver.check_one_availability(domain).await })
        .buffer_unordered(BULK_AVAILABILITY_CONCURRENCY)
        .collect()
        .await
}

/// `total = registration_price*years + 0.18*years + (privacy ? privacyPrice : 0)`.
pub fn compute_quote(
    registration_price_usd: rust_decimal::Decimal,
    icann_fee_per_year_usd: rust_decimal::Decimal,
    privacy_price_usd: rust_decimal::Decimal,
    years: u8,
    privacy: bool,
    premium: bool,
) -> Quote {
    let years_dec = rust_decimal::Decimal::from(years);
    let mut total = registration_price_usd * years_dec + icann_fee_per_year_usd * years_dec;
    if privacy {
        total += privacy_price_usd;
    }
    Quote {
        registration_price_usd,
        icann_fee_usd: icann_fee_per_year_usd * years_dec,
        privacy_price_usd: if privacy { privacy_price_usd } else { rust_decimal::Decimal::ZERO },
        total_usd: total,
        premium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> rust_decimal::Decimal {
        rust_decimal::Decimal::from_str(s).unwrap()
    }

    #[test]
    fn quote_matches_formula_without_privacy() {
        let q = compute_quote(d("10.99"), d("0.18"), d("2.99"), 2, false, false);
        assert_eq!(q.total_usd, d("22.34"));
    }

    #[test]
    fn quote_matches_formula_with_privacy() {
        let q = compute_quote(d("10.99"), d("0.18"), d("2.99"), 1, true, false);
        assert_eq!(q.total_usd, d("14.16"));
    }
}
