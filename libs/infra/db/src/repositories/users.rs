// [libs/infra/db/src/repositories/users.rs]
/*!
 * Repositorio de usuarios y llaves API. `ApiKey` es el único credential
 * soportado (bearer opaco); la resolución llave→usuario es la base del
 * middleware de autenticación.
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::Utc;
use gatewayrs_domain_models::{ApiKey, User};
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct UserRepository {
    database_client: TursoClient,
}

impl UserRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, email: &str) -> Result<User, DbError> {
        let connection = self.database_client.get_connection()?;
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        };

        connection
            .execute(
                "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
                params![
                    user.id.to_string(),
                    user.email.clone(),
                    user.created_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| map_unique(e, "users.email"))?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, email, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Resuelve el propietario de una llave API, junto a la llave misma.
    #[instrument(skip(self, raw_key))]
    pub async fn find_user_by_api_key(&self, raw_key: &str) -> Result<Option<(User, ApiKey)>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT u.id, u.email, u.created_at, k.id, k.key, k.user_id
                 FROM api_keys k JOIN users u ON u.id = k.user_id
                 WHERE k.key = ?1",
                params![raw_key.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let user = User {
                    id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                    email: row.get(1)?,
                    created_at: row
                        .get::<String>(2)?
                        .parse()
                        .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
                };
                let api_key = ApiKey {
                    id: Uuid::parse_str(&row.get::<String>(3)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                    key: row.get(4)?,
                    user_id: Uuid::parse_str(&row.get::<String>(5)?).map_err(|e| DbError::MappingError(e.to_string()))?,
                };
                Ok(Some((user, api_key)))
            }
            None => Ok(None),
        }
    }

    pub async fn issue_api_key(&self, user_id: Uuid, raw_key: &str) -> Result<ApiKey, DbError> {
        let connection = self.database_client.get_connection()?;
        let api_key = ApiKey {
            id: Uuid::new_v4(),
            key: raw_key.to_string(),
            user_id,
        };

        connection
            .execute(
                "INSERT INTO api_keys (id, key, user_id) VALUES (?1, ?2, ?3)",
                params![api_key.id.to_string(), api_key.key.clone(), api_key.user_id.to_string()],
            )
            .await
            .map_err(|e| map_unique(e, "api_keys.key"))?;

        Ok(api_key)
    }
}

fn row_to_user(row: &libsql::Row) -> Result<User, DbError> {
    Ok(User {
        id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        email: row.get(1)?,
        created_at: row
            .get::<String>(2)?
            .parse()
            .map_err(|e: chrono::ParseError| DbError::MappingError(e.to_string()))?,
    })
}

fn map_unique(e: libsql::Error, field: &str) -> DbError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DbError::UniqueViolation(field.to_string())
    } else {
        DbError::QueryError(e)
    }
}
