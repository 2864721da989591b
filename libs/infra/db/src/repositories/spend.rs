// [libs/infra/db/src/repositories/spend.rs]
/*!
 * Implementación durable de `SpendLedgerStore` (C2) sobre Turso. `add`
 * es un upsert atómico: `total_usd_cents = total_usd_cents + ?` vive
 * dentro del propio `ON CONFLICT`, por lo que dos `add` concurrentes
 * para la misma (cuenta, día) ambos aterrizan correctamente sin lectura
 * intermedia. El total se guarda en centavos enteros porque SQLite
 * carece de un tipo decimal nativo y el incremento debe ser exacto.
 */

use crate::errors::DbError;
use crate::TursoClient;
use async_trait::async_trait;
use chrono::NaiveDate;
use gatewayrs_domain_billing::{SpendLedgerError, SpendLedgerStore};
use libsql::params;
use rust_decimal::Decimal;
use tracing::instrument;

pub struct SpendRepository {
    database_client: TursoClient,
}

impl SpendRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }
}

fn usd_to_cents(amount: Decimal) -> Result<i64, SpendLedgerError> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .try_into()
        .map_err(|_| SpendLedgerError::Store("amount overflows i64 cents".into()))
}

fn cents_to_usd(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[async_trait]
impl SpendLedgerStore for SpendRepository {
    #[instrument(skip(self))]
    async fn get_total(&self, account_key: &str, day: NaiveDate) -> Result<Decimal, SpendLedgerError> {
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| SpendLedgerError::from(DbError::from(e)))?;

        let mut rows = connection
            .query(
                "SELECT total_usd_cents FROM daily_spend WHERE account_key = ?1 AND day = ?2",
                params![account_key.to_string(), day.to_string()],
            )
            .await
            .map_err(|e| SpendLedgerError::from(DbError::QueryError(e)))?;

        match rows.next().await.map_err(|e| SpendLedgerError::from(DbError::QueryError(e)))? {
            Some(row) => {
                let cents: i64 = row.get(0).map_err(|e| SpendLedgerError::from(DbError::QueryError(e)))?;
                Ok(cents_to_usd(cents))
            }
            None => Ok(Decimal::ZERO),
        }
    }

    #[instrument(skip(self))]
    async fn add(&self, account_key: &str, day: NaiveDate, amount: Decimal) -> Result<Decimal, SpendLedgerError> {
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| SpendLedgerError::from(DbError::from(e)))?;

        let delta_cents = usd_to_cents(amount)?;

        connection
            .execute(
                "INSERT INTO daily_spend (account_key, day, total_usd_cents) VALUES (?1, ?2, ?3)
                 ON CONFLICT(account_key, day) DO UPDATE SET
                    total_usd_cents = total_usd_cents + excluded.total_usd_cents",
                params![account_key.to_string(), day.to_string(), delta_cents],
            )
            .await
            .map_err(|e| SpendLedgerError::from(DbError::QueryError(e)))?;

        self.get_total(account_key, day).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cents_round_trip() {
        let d = Decimal::from_str("12.34").unwrap();
        assert_eq!(usd_to_cents(d).unwrap(), 1234);
        assert_eq!(cents_to_usd(1234), d);
    }
}
