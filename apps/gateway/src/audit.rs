// [apps/gateway/src/audit.rs]
/*!
 * Helpers de grabación de auditoría. Append-only, nunca leído por la
 * tubería de compra ni de búsqueda; las fallas de escritura se
 * registran en logs pero no abortan la petición que las disparó, ya
 * que el rastro forense nunca debe ser capaz de tumbar una compra que
 * ya se comprometió con el registrador.
 */

use gatewayrs_domain_models::AuditLog;
use gatewayrs_infra_db::AuditRepository;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

pub async fn record(repo: &AuditRepository, user_id: Option<Uuid>, verb: &str, payload: Value) {
    let entry = AuditLog::new(user_id, verb, payload);
    if let Err(e) = repo.record(&entry).await {
        error!(verb, error = %e, "failed to persist audit log entry");
    }
}
