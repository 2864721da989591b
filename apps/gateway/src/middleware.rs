// [apps/gateway/src/middleware.rs]
/*!
 * Guardias de frontera (C10): resolución de identidad, exigencia de
 * autenticación y límite de tasa. Se aplican en ese orden a las rutas
 * que los necesitan; `/health` y `/metrics` no pasan por ninguno.
 */

use crate::errors::GatewayError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use gatewayrs_domain_models::User;
use tracing::debug;

/// Identidad resuelta para la petición actual. `user` es `None` cuando
/// no se presentó un bearer válido; `account_key` siempre existe
/// (`"anon"` en ese caso) porque el limitador de tasa necesita una
/// clave incluso para tráfico no autenticado.
#[derive(Clone)]
pub struct Identity {
    pub account_key: String,
    pub user: Option<User>,
}

/// Extrae el bearer (si lo hay), resuelve el `User` dueño de la llave
/// API y adjunta `Identity` a las extensiones de la petición. Nunca
/// rechaza: la decisión de exigir autenticación vive en
/// `require_auth`.
pub async fn resolve_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let identity = match token {
        Some(raw_key) => match state.users.find_user_by_api_key(raw_key).await {
            Ok(Some((user, _api_key))) => {
                debug!(user_id = %user.id, "🔑 [AUTH]: bearer resolved to user");
                Identity { account_key: user.id.to_string(), user: Some(user) }
            }
            _ => Identity { account_key: "anon".to_string(), user: None },
        },
        None => Identity { account_key: "anon".to_string(), user: None },
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}

/// Exige que `resolve_identity` haya encontrado un usuario. Debe
/// aplicarse después de `resolve_identity` en la pila de capas.
pub async fn require_auth(req: Request, next: Next) -> Result<Response, GatewayError> {
    let authenticated = req
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.user.is_some())
        .unwrap_or(false);

    if !authenticated {
        return Err(GatewayError::Unauthorized);
    }
    Ok(next.run(req).await)
}

/// Consulta el limitador de tasa (C6) con la `account_key` ya resuelta
/// por `resolve_identity`. Debe aplicarse después de esa capa.
pub async fn rate_limit_guard(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, GatewayError> {
    let account_key = req
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.account_key.clone())
        .unwrap_or_else(|| "anon".to_string());

    let now_ms = now_epoch_ms();
    let decision = state.rate_limiter.consume(&account_key, now_ms);
    if !decision.allowed {
        return Err(GatewayError::RateLimited { retry_after_secs: decision.retry_after_secs });
    }
    Ok(next.run(req).await)
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
