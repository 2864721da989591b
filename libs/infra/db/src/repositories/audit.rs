// [libs/infra/db/src/repositories/audit.rs]
/*!
 * Repositorio de auditoría. Append-only; jamás leído por la tubería de
 * compra, existe para el rastro forense.
 */

use crate::errors::DbError;
use crate::TursoClient;
use gatewayrs_domain_models::AuditLog;
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct AuditRepository {
    database_client: TursoClient,
}

impl AuditRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self, entry))]
    pub async fn record(&self, entry: &AuditLog) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO audit_log (id, user_id, verb, payload_json, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.id.to_string(),
                    entry.user_id.map(|id| id.to_string()),
                    entry.verb.clone(),
                    entry.payload_json.to_string(),
                    entry.created_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn recent_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AuditLog>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, user_id, verb, payload_json, created_at FROM audit_log
                 WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                params![user_id.to_string(), limit],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(AuditLog {
                id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                user_id: row
                    .get::<Option<String>>(1)?
                    .map(|s| Uuid::parse_str(&s))
                    .transpose()
                    .map_err(|e| DbError::MappingError(e.to_string()))?,
                verb: row.get(2)?,
                payload_json: serde_json::from_str(&row.get::<String>(3)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                created_at: row
                    .get::<String>(4)?
                    .parse()
                    .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
            });
        }
        Ok(out)
    }
}
