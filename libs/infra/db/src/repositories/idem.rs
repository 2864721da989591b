// [libs/infra/db/src/repositories/idem.rs]
/*!
 * Implementación durable de `IdemStore` (C3) sobre Turso. El borrado de
 * filas vencidas ocurre de forma perezosa: cualquier lectura que
 * encuentre una fila expirada la elimina antes de reportar ausencia.
 */

use crate::errors::DbError;
use crate::TursoClient;
use async_trait::async_trait;
use chrono::Utc;
use gatewayrs_domain_idempotency::{IdemStore, IdempotencyError};
use gatewayrs_domain_models::IdemRecord;
use libsql::params;
use tracing::instrument;

pub struct IdemRepository {
    database_client: TursoClient,
}

impl IdemRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /// `fail(key)`: borra la fila si existe, per C3 §4.3.
    #[instrument(skip(self))]
    pub async fn fail_row(&self, key: &str) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute("DELETE FROM idem WHERE key = ?1", params![key.to_string()])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdemStore for IdemRepository {
    async fn get(&self, key: &str) -> Result<Option<IdemRecord>, IdempotencyError> {
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| IdempotencyError::from(DbError::from(e)))?;

        let mut rows = connection
            .query(
                "SELECT key, digest, response_json, expires_at, created_at FROM idem WHERE key = ?1",
                params![key.to_string()],
            )
            .await
            .map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?;

        let Some(row) = row else { return Ok(None) };

        let expires_at: chrono::DateTime<Utc> = row
            .get::<String>(3)
            .map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?
            .parse()
            .map_err(|e: chrono::ParseError| IdempotencyError::from(DbError::MappingError(e.to_string())))?;

        if expires_at <= Utc::now() {
            self.fail_row(key).await.map_err(IdempotencyError::from)?;
            return Ok(None);
        }

        Ok(Some(IdemRecord {
            key: row.get(0).map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?,
            digest: row.get(1).map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?,
            response_json: serde_json::from_str(
                &row.get::<String>(2).map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?,
            )
            .map_err(|e| IdempotencyError::from(DbError::MappingError(e.to_string())))?,
            expires_at,
            created_at: row
                .get::<String>(4)
                .map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?
                .parse()
                .map_err(|e: chrono::ParseError| IdempotencyError::from(DbError::MappingError(e.to_string())))?,
        }))
    }

    async fn put(&self, record: IdemRecord) -> Result<(), IdempotencyError> {
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| IdempotencyError::from(DbError::from(e)))?;

        connection
            .execute(
                "INSERT INTO idem (key, digest, response_json, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key) DO UPDATE SET
                    digest = excluded.digest,
                    response_json = excluded.response_json,
                    expires_at = excluded.expires_at",
                params![
                    record.key,
                    record.digest,
                    record.response_json.to_string(),
                    record.expires_at.to_rfc3339(),
                    record.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| IdempotencyError::from(DbError::QueryError(e)))?;

        Ok(())
    }

    async fn fail(&self, key: &str) -> Result<(), IdempotencyError> {
        self.fail_row(key).await.map_err(IdempotencyError::from)
    }
}
