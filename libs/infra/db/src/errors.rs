// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V180.7 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el cluster de Turso.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (Variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el Dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// El registro solicitado no existe en la tabla.
    #[error("[L3_DB_FAULT]: RECORD_NOT_FOUND")]
    NotFound,

    /// Violación de unicidad (email, domain name, order id, idem key).
    #[error("[L3_DB_FAULT]: UNIQUE_CONSTRAINT_VIOLATION -> {0}")]
    UniqueViolation(String),
}

impl From<DbError> for gatewayrs_domain_billing::SpendLedgerError {
    fn from(e: DbError) -> Self {
        gatewayrs_domain_billing::SpendLedgerError::Store(e.to_string())
    }
}

impl From<DbError> for gatewayrs_domain_idempotency::IdempotencyError {
    fn from(e: DbError) -> Self {
        gatewayrs_domain_idempotency::IdempotencyError::Store(e.to_string())
    }
}
