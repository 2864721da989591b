// [libs/infra/db/src/repositories/domains.rs]
/*!
 * Repositorio de dominios. `create_purchased` es la única vía de
 * creación: un dominio nace ya en estado PURCHASED, nunca antes.
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::Utc;
use gatewayrs_domain_models::{Domain, DomainStatus};
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct DomainRepository {
    database_client: TursoClient,
}

impl DomainRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Domain>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, name, user_id, registrar, status, privacy, auto_renew, created_at, updated_at
                 FROM domains WHERE name = ?1",
                params![name.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_domain(&row)?)),
            None => Ok(None),
        }
    }

    /// Crea el dominio en estado PURCHASED, o lo reutiliza si ya existe.
    /// Llamado desde la tubería de compra inmediatamente tras `register`
    /// exitoso, que puede reintentarse con la misma clave de
    /// idempotencia tras un fallo posterior de la región protegida; un
    /// `INSERT` liso moriría en la restricción UNIQUE de `domains.name`
    /// en ese reintento, así que esto es un upsert por nombre que
    /// conserva el `id` original y solo refresca estado y `updated_at`.
    #[instrument(skip(self))]
    pub async fn create_purchased(
        &self,
        name: &str,
        user_id: Uuid,
        registrar: &str,
        privacy: bool,
        auto_renew: bool,
    ) -> Result<Domain, DbError> {
        let connection = self.database_client.get_connection()?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let mut rows = connection
            .query(
                "INSERT INTO domains (id, name, user_id, registrar, status, privacy, auto_renew, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(name) DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at
                 RETURNING id, name, user_id, registrar, status, privacy, auto_renew, created_at, updated_at",
                params![
                    id.to_string(),
                    name.to_string(),
                    user_id.to_string(),
                    registrar.to_string(),
                    DomainStatus::Purchased.as_str(),
                    privacy as i64,
                    auto_renew as i64,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .await?;

        let row = rows
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("upsert into domains returned no row".to_string()))?;
        row_to_domain(&row)
    }

    pub async fn set_status(&self, domain_id: Uuid, status: DomainStatus) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "UPDATE domains SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![
                    domain_id.to_string(),
                    status.as_str(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }
}

fn row_to_domain(row: &libsql::Row) -> Result<Domain, DbError> {
    let status_str: String = row.get(4)?;
    Ok(Domain {
        id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        name: row.get(1)?,
        user_id: Uuid::parse_str(&row.get::<String>(2)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        registrar: row.get(3)?,
        status: DomainStatus::parse(&status_str),
        privacy: row.get::<i64>(5)? != 0,
        auto_renew: row.get::<i64>(6)? != 0,
        created_at: row
            .get::<String>(7)?
            .parse()
            .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
        updated_at: row
            .get::<String>(8)?
            .parse()
            .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
    })
}
