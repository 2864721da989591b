// [apps/gateway/src/handlers/health.rs]
/*!
 * `/health`: sin autenticación, sin límite de tasa. Surge el modo
 * dry-run en la respuesta para que un operador pueda detectar en
 * caliente si las llamadas mutantes al registrador se están
 * simulando, sin tener que inspeccionar variables de entorno.
 */

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.uptime_secs(),
        "dry_run": state.config.dry_run,
        "provider": state.config.default_provider,
    }))
}
