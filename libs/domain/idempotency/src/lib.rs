// [libs/domain/idempotency/src/lib.rs]
/*!
 * Escalera de idempotencia (C3) y mutex por llave en proceso (C4).
 *
 * C3 evita que un reintento de cliente con la misma `Idempotency-Key`
 * ejecute una compra dos veces: la primera llamada calcula un digest
 * canónico del cuerpo de la petición, lo guarda junto a la respuesta
 * cuando termina, y cualquier reintento con la misma llave pero un
 * digest distinto se rechaza como conflicto en lugar de reproducirse.
 *
 * C4 serializa el acceso concurrente a una misma llave dentro de un solo
 * proceso; dos peticiones por la misma `Idempotency-Key` que lleguen a la
 * vez deben ejecutarse una tras otra, nunca en paralelo.
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use gatewayrs_domain_models::IdemRecord;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Error)]
pub enum IdempotencyError {
    #[error("idempotency store failure: {0}")]
    Store(String),
}

#[async_trait]
pub trait IdemStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<IdemRecord>, IdempotencyError>;
    async fn put(&self, record: IdemRecord) -> Result<(), IdempotencyError>;
    /// Borra la fila de `key` si existe. Llamado cuando la operación
    /// protegida falla dentro de la región guardada, para que un
    /// reintento con la misma llave pueda volver a empezar.
    async fn fail(&self, key: &str) -> Result<(), IdempotencyError>;
}

/// Resultado de consultar el estado de una llave antes de ejecutar la
/// operación protegida.
#[derive(Debug)]
pub enum BeginOutcome {
    /// Ninguna ejecución previa registrada (o la previa expiró); procede.
    Start,
    /// Una ejecución previa con el mismo digest ya completó: reproduce su
    /// respuesta sin tocar el resto del sistema.
    Replay(serde_json::Value),
    /// Una ejecución previa con un digest distinto existe bajo la misma
    /// llave: el cliente reusó la llave para una intención diferente.
    Conflict,
}

/// SHA-256 hexadecimal sobre la serialización canónica (claves ordenadas)
/// del cuerpo de la petición.
pub fn canonical_digest(body: &serde_json::Value) -> String {
    let bytes = serde_json::to_vec(body).expect("json::Value serialization is infallible");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

pub async fn begin(
    store: &dyn IdemStore,
    key: &str,
    digest: &str,
) -> Result<BeginOutcome, IdempotencyError> {
    match store.get(key).await? {
        None => Ok(BeginOutcome::Start),
        Some(record) if record.expires_at <= Utc::now() => Ok(BeginOutcome::Start),
        Some(record) if record.digest == digest => Ok(BeginOutcome::Replay(record.response_json)),
        Some(_) => Ok(BeginOutcome::Conflict),
    }
}

/// Registra la respuesta final de una operación protegida bajo `key`,
/// válida por `ttl` antes de poder reutilizarse para una intención nueva.
pub async fn commit(
    store: &dyn IdemStore,
    key: &str,
    digest: &str,
    response_json: serde_json::Value,
    ttl: ChronoDuration,
) -> Result<(), IdempotencyError> {
    let now = Utc::now();
    store
        .put(IdemRecord {
            key: key.to_string(),
            digest: digest.to_string(),
            response_json,
            expires_at: now + ttl,
            created_at: now,
        })
        .await
}

/// Mapa de mutexes por llave, para serializar el acceso concurrente a una
/// misma `Idempotency-Key` dentro de un proceso. Las entradas no se
/// purgan activamente: dado que el conjunto de llaves activas por
/// proceso en un instante dado es acotado por el tráfico real, se deja
/// crecer y vive por la duración del proceso.
#[derive(Default)]
pub struct KeyMutexMap {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyMutexMap {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Adquiere el lock para `key`, creándolo si es la primera vez que se
    /// ve. Los adquirentes en espera se sirven en el orden en que
    /// llamaron, por la garantía FIFO de `tokio::sync::Mutex`.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct MemStore {
        rows: RwLock<HashMap<String, IdemRecord>>,
    }

    #[async_trait]
    impl IdemStore for MemStore {
        async fn get(&self, key: &str) -> Result<Option<IdemRecord>, IdempotencyError> {
            Ok(self.rows.read().await.get(key).cloned())
        }

        async fn put(&self, record: IdemRecord) -> Result<(), IdempotencyError> {
            self.rows.write().await.insert(record.key.clone(), record);
            Ok(())
        }

        async fn fail(&self, key: &str) -> Result<(), IdempotencyError> {
            self.rows.write().await.remove(key);
            Ok(())
        }
    }

    #[test]
    fn digest_is_stable_regardless_of_key_insertion_order() {
        let a = json!({"domain": "example.com", "years": 1});
        let b = json!({"years": 1, "domain": "example.com"});
        assert_eq!(canonical_digest(&a), canonical_digest(&b));
    }

    #[test]
    fn digest_changes_with_value() {
        let a = json!({"domain": "example.com", "years": 1});
        let b = json!({"domain": "example.com", "years": 2});
        assert_ne!(canonical_digest(&a), canonical_digest(&b));
    }

    #[tokio::test]
    async fn fresh_key_starts() {
        let store = MemStore::default();
        let outcome = begin(&store, "buy:example.com:k1", "deadbeef").await.unwrap();
        assert!(matches!(outcome, BeginOutcome::Start));
    }

    #[tokio::test]
    async fn matching_digest_replays() {
        let store = MemStore::default();
        let resp = json!({"status": "purchased"});
        commit(&store, "buy:example.com:k1", "deadbeef", resp.clone(), ChronoDuration::hours(24))
            .await
            .unwrap();
        let outcome = begin(&store, "buy:example.com:k1", "deadbeef").await.unwrap();
        match outcome {
            BeginOutcome::Replay(v) => assert_eq!(v, resp),
            other => panic!("expected Replay, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mismatched_digest_conflicts() {
        let store = MemStore::default();
        commit(&store, "buy:example.com:k1", "deadbeef", json!({}), ChronoDuration::hours(24))
            .await
            .unwrap();
        let outcome = begin(&store, "buy:example.com:k1", "cafebabe").await.unwrap();
        assert!(matches!(outcome, BeginOutcome::Conflict));
    }

    #[tokio::test]
    async fn expired_record_allows_restart() {
        let store = MemStore::default();
        store
            .put(IdemRecord {
                key: "buy:example.com:k1".to_string(),
                digest: "deadbeef".to_string(),
                response_json: json!({}),
                expires_at: Utc::now() - ChronoDuration::seconds(1),
                created_at: Utc::now() - ChronoDuration::hours(25),
            })
            .await
            .unwrap();
        let outcome = begin(&store, "buy:example.com:k1", "deadbeef").await.unwrap();
        assert!(matches!(outcome, BeginOutcome::Start));
    }

    #[tokio::test]
    async fn key_mutex_serializes_same_key() {
        let map = Arc::new(KeyMutexMap::new());
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let m1 = map.clone();
        let o1 = order.clone();
        let h1 = tokio::spawn(async move {
            let _guard = m1.acquire("same-key").await;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            o1.lock().await.push(1);
        });

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let m2 = map.clone();
        let o2 = order.clone();
        let h2 = tokio::spawn(async move {
            let _guard = m2.acquire("same-key").await;
            o2.lock().await.push(2);
        });

        h1.await.unwrap();
        h2.await.unwrap();
        assert_eq!(*order.lock().await, vec![1, 2]);
    }
}
