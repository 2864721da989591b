// [libs/infra/db/src/repositories/purchases.rs]
/*!
 * Repositorio de compras. Append-only: `Purchase.order_id` es la ancla
 * de unicidad de último recurso entre instancias concurrentes.
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::Utc;
use gatewayrs_domain_models::Purchase;
use libsql::params;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

pub struct PurchaseRepository {
    database_client: TursoClient,
}

impl PurchaseRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn insert(
        &self,
        user_id: Uuid,
        domain_id: Uuid,
        registrar: &str,
        order_id: &str,
        years: u8,
        total_usd: Decimal,
        premium: bool,
    ) -> Result<Purchase, DbError> {
        let connection = self.database_client.get_connection()?;
        let purchase = Purchase {
            id: Uuid::new_v4(),
            user_id,
            domain_id,
            registrar: registrar.to_string(),
            order_id: order_id.to_string(),
            years,
            total_usd,
            premium,
            created_at: Utc::now(),
        };

        connection
            .execute(
                "INSERT INTO purchases (id, user_id, domain_id, registrar, order_id, years, total_usd, premium, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    purchase.id.to_string(),
                    purchase.user_id.to_string(),
                    purchase.domain_id.to_string(),
                    purchase.registrar.clone(),
                    purchase.order_id.clone(),
                    purchase.years as i64,
                    purchase.total_usd.to_string(),
                    purchase.premium as i64,
                    purchase.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| map_unique(e, "purchases.order_id"))?;

        Ok(purchase)
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Purchase>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, user_id, domain_id, registrar, order_id, years, total_usd, premium, created_at
                 FROM purchases WHERE order_id = ?1",
                params![order_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Purchase {
                id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                user_id: Uuid::parse_str(&row.get::<String>(1)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                domain_id: Uuid::parse_str(&row.get::<String>(2)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                registrar: row.get(3)?,
                order_id: row.get(4)?,
                years: row.get::<i64>(5)? as u8,
                total_usd: Decimal::from_str(&row.get::<String>(6)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                premium: row.get::<i64>(7)? != 0,
                created_at: row
                    .get::<String>(8)?
                    .parse()
                    .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
            })),
            None => Ok(None),
        }
    }
}

fn map_unique(e: libsql::Error, field: &str) -> DbError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DbError::UniqueViolation(field.to_string())
    } else {
        DbError::QueryError(e)
    }
}
