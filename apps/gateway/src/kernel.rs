// [apps/gateway/src/kernel.rs]
/*!
 * Composition root. Construye `AppState` a partir de `AppConfig`,
 * levanta el router y sirve sobre TCP. Nada más en el proceso arranca
 * antes de que este módulo termine de ensamblar el estado.
 */

use crate::config::AppConfig;
use crate::routes::create_router;
use crate::state::AppState;
use gatewayrs_infra_db::TursoClient;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info, instrument};

pub struct GatewayKernel {
    pub port: u16,
    pub application_state: AppState,
}

impl GatewayKernel {
    #[instrument(skip(config))]
    pub async fn ignite(config: AppConfig) -> Self {
        let database_client = TursoClient::connect(&config.database_url, config.turso_auth_token.clone())
            .await
            .expect("FATAL: database link collapse, ignition aborted");

        let port = config.port;
        let application_state =
            AppState::new(config, database_client).expect("FATAL: failed to assemble application state");

        Self { port, application_state }
    }

    pub async fn launch(self) {
        let router = create_router(self.application_state);
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.port);

        info!("🚀 [KERNEL_ONLINE]: gateway listening at {}", bind_address);

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .expect("CRITICAL_FAULT: failed to bind network port");

        if let Err(e) = axum::serve(listener, router).await {
            error!("💀 [KERNEL_COLLAPSE]: server runtime failure: {}", e);
            std::process::exit(1);
        }
    }
}
