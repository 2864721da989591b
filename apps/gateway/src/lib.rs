// [apps/gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY LIBRARY ROOT
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL GATEWAY
 * =================================================================
 */

// --- ESTRATO DE ARRANQUE Y CONFIGURACIÓN ---
/// Lectura y validación de variables de entorno.
pub mod config;
/// Taxonomía de errores de la frontera HTTP (C10).
pub mod errors;

// --- ESTRATO DE DATOS Y ESTADO ---
/// Catálogo de plantillas de DNS aplicadas tras un registro.
pub mod dns_templates;
/// Helpers de grabación del rastro de auditoría.
pub mod audit;
/// Normalización y validación sintáctica de nombres de dominio.
pub mod normalize;
/// Estado compartido inyectado en cada handler.
pub mod state;

// --- ESTRATO DE TRANSPORTE Y ACCIÓN ---
/// Adaptadores de entrada HTTP: búsqueda, compra, estado y salud.
pub mod handlers;
/// Núcleo de mando: ignición del estado y arranque del servidor.
pub mod kernel;
/// Topología de rutas y capas de frontera.
pub mod routes;

// --- ESTRATO DE SEGURIDAD ---
/// Guardianes de identidad, autenticación y límite de tasa.
pub mod middleware;

pub mod prelude {
    pub use crate::kernel::GatewayKernel;
    pub use crate::state::AppState;
}
