// [apps/gateway/src/routes.rs]
/*!
 * Topología de rutas del gateway. Cinco rutas, ninguna más: `/health`
 * y `/metrics` sin guardias; `/search` y `/status/:domain` con
 * identidad opcional; `/buy` con identidad obligatoria. Todas pasan
 * por el mismo escudo CORS.
 */

use crate::handlers::{buy, health, metrics, search, status};
use crate::middleware::{rate_limit_guard, require_auth, resolve_identity};
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(application_shared_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // Identidad opcional + límite de tasa; ningún bearer requerido.
    let publicly_rate_limited = Router::new()
        .route("/search", post(search::search))
        .route("/status/:domain", get(status::status))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), rate_limit_guard))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), resolve_identity));

    // Identidad obligatoria además del límite de tasa.
    let authenticated = Router::new()
        .route("/buy", post(buy::buy))
        .layer(middleware::from_fn(require_auth))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), rate_limit_guard))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), resolve_identity));

    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .merge(publicly_rate_limited)
        .merge(authenticated)
        .layer(cors)
        .with_state(application_shared_state)
}
