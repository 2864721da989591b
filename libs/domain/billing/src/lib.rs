// [libs/domain/billing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SPEND LEDGER ENGINE (V1.2 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GOBERNANZA DE TECHOS DE GASTO DIARIO POR CUENTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ADITIVIDAD: El total acumulado de una cuenta-día nunca decrece; solo
 *    `add` lo mueve, y siempre hacia arriba.
 * 2. ATOMICIDAD: La suma de un monto al total vive detrás de un upsert
 *    atómico en el almacén (ver `SpendLedgerStore`); este módulo no asume
 *    nada sobre el motor de persistencia concreto.
 * 3. NOMINAL PURITY: Los tres cálculos de techo (`would_exceed`,
 *    `remaining`, `get_total`) son funciones puras sobre `Decimal`.
 * =================================================================
 */

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpendLedgerError {
    #[error("spend ledger store failure: {0}")]
    Store(String),
}

/// Contrato de persistencia para el libro mayor de gasto. Una
/// implementación concreta (Turso/libsql) vive en la capa de
/// infraestructura; este trait solo exige atomicidad en `add`.
#[async_trait]
pub trait SpendLedgerStore: Send + Sync {
    /// Total acumulado para `account_key` en `day` (UTC). Cero si no hay
    /// fila.
    async fn get_total(&self, account_key: &str, day: NaiveDate) -> Result<Decimal, SpendLedgerError>;

    /// Suma `amount` al total de `account_key` en `day` de forma atómica
    /// (upsert) y devuelve el nuevo total.
    async fn add(
        &self,
        account_key: &str,
        day: NaiveDate,
        amount: Decimal,
    ) -> Result<Decimal, SpendLedgerError>;
}

/// `true` si sumar `amount` al `current_total` rebasaría `cap`.
///
/// Un `cap` de `None` significa sin techo configurado: nunca rebasa.
pub fn would_exceed(current_total: Decimal, amount: Decimal, cap: Option<Decimal>) -> bool {
    match cap {
        Some(cap) => current_total + amount > cap,
        None => false,
    }
}

/// Remanente disponible bajo `cap` dado `current_total`, nunca negativo.
pub fn remaining(current_total: Decimal, cap: Option<Decimal>) -> Decimal {
    match cap {
        Some(cap) => (cap - current_total).max(Decimal::ZERO),
        None => Decimal::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn would_exceed_is_false_under_cap() {
        assert!(!would_exceed(d("10.00"), d("5.00"), Some(d("20.00"))));
    }

    #[test]
    fn would_exceed_is_true_exactly_over_cap() {
        assert!(would_exceed(d("19.00"), d("1.01"), Some(d("20.00"))));
    }

    #[test]
    fn would_exceed_is_false_when_exactly_at_cap() {
        assert!(!would_exceed(d("19.00"), d("1.00"), Some(d("20.00"))));
    }

    #[test]
    fn would_exceed_is_false_with_no_cap() {
        assert!(!would_exceed(d("1000000.00"), d("1000000.00"), None));
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining(d("25.00"), Some(d("20.00"))), Decimal::ZERO);
    }

    #[test]
    fn remaining_subtracts_total_from_cap() {
        assert_eq!(remaining(d("12.50"), Some(d("20.00"))), d("7.50"));
    }
}
