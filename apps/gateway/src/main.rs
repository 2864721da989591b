// [apps/gateway/src/main.rs]
/*!
 * Punto de entrada del binario. Configuración inválida sale con
 * código 1 antes de tocar la red; ninguna otra condición de arranque
 * produce un código de salida distinto de 0.
 */

use dotenvy::dotenv;
use gatewayrs_gateway::config::AppConfig;
use gatewayrs_gateway::prelude::*;
use gatewayrs_shared_heimdall::init_tracing;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("gatewayrs_gateway");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(reason) => {
            eprintln!("CONFIGURATION_INVALID: {reason}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        info!("🛰️  [GATEWAY]: ignition sequence starting on port {}", config.port);
        let kernel = GatewayKernel::ignite(config).await;
        kernel.launch().await;
    });

    Ok(())
}
