// [libs/infra/db/src/lib.rs]
/*!
 * Capa de persistencia (Motor A). Expone `TursoClient` como punto de
 * enlace y un repositorio por entidad del modelo de dominio. Los
 * repositorios de idempotencia y gasto implementan los traits de
 * almacenamiento que sus respectivos crates de dominio declaran, para
 * que `apps/gateway` pueda inyectarlos sin que el dominio conozca
 * libSQL.
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use errors::DbError;
pub use repositories::{
    AuditRepository, DomainRepository, IdemRepository, PurchaseRepository, SpendRepository, UserRepository,
};

pub mod prelude {
    pub use crate::errors::DbError;
    pub use crate::repositories::*;
    pub use crate::TursoClient;
}
