// [libs/infra/db/src/schema.rs]
/**
 * =================================================================
 * APARATO: GATEWAY DATABASE SCHEMA (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del gateway de registro de dominios.
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_USERS", r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_API_KEYS", r#"
        CREATE TABLE IF NOT EXISTS api_keys (
            id TEXT PRIMARY KEY,
            key TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL REFERENCES users(id)
        );
    "#),
    ("TABLE_DOMAINS", r#"
        CREATE TABLE IF NOT EXISTS domains (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            registrar TEXT NOT NULL,
            status TEXT NOT NULL,
            privacy INTEGER NOT NULL,
            auto_renew INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#),
    ("TABLE_PURCHASES", r#"
        CREATE TABLE IF NOT EXISTS purchases (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            domain_id TEXT NOT NULL,
            registrar TEXT NOT NULL,
            order_id TEXT NOT NULL UNIQUE,
            years INTEGER NOT NULL,
            total_usd TEXT NOT NULL,
            premium INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_AUDIT_LOG", r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            verb TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_IDEM", r#"
        CREATE TABLE IF NOT EXISTS idem (
            key TEXT PRIMARY KEY,
            digest TEXT NOT NULL,
            response_json TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_DAILY_SPEND", r#"
        CREATE TABLE IF NOT EXISTS daily_spend (
            account_key TEXT NOT NULL,
            day TEXT NOT NULL,
            -- Stored as integer cents to keep the atomic increment exact;
            -- SQLite has no native decimal type.
            total_usd_cents INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (account_key, day)
        );
    "#),
];

/**
 * ESTRATO 2: ENDURECIMIENTO (Índices de Aceleración)
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_API_KEYS_USER", "CREATE INDEX IF NOT EXISTS idx_api_keys_user ON api_keys(user_id);"),
    ("IDX_DOMAINS_USER", "CREATE INDEX IF NOT EXISTS idx_domains_user ON domains(user_id);"),
    ("IDX_PURCHASES_USER", "CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases(user_id);"),
    ("IDX_PURCHASES_DOMAIN", "CREATE INDEX IF NOT EXISTS idx_purchases_domain ON purchases(domain_id);"),
    ("IDX_AUDIT_USER", "CREATE INDEX IF NOT EXISTS idx_audit_user ON audit_log(user_id);"),
    ("IDX_IDEM_EXPIRES", "CREATE INDEX IF NOT EXISTS idx_idem_expires ON idem(expires_at);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    solidify_base_strata(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Gateway ledger level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
