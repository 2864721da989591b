// [apps/gateway/src/handlers/metrics.rs]
/*!
 * `/metrics`: exposición de texto al estilo Prometheus. El formato de
 * cable en sí está fuera del alcance de este sistema; se expone lo
 * mínimo que un scrape necesita para confirmar que el proceso está
 * vivo y cuántas cuentas tiene bajo vigilancia el limitador de tasa.
 */

use crate::state::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = format!(
        "# HELP gateway_uptime_seconds Seconds since process start.\n\
         # TYPE gateway_uptime_seconds gauge\n\
         gateway_uptime_seconds {}\n\
         # HELP gateway_rate_limited_keys Distinct account keys currently tracked by the rate limiter.\n\
         # TYPE gateway_rate_limited_keys gauge\n\
         gateway_rate_limited_keys {}\n",
        state.uptime_secs(),
        state.rate_limiter.key_count(),
    );

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
