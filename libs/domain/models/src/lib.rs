// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY DOMAIN MODELS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN ENTITIES (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN SOBERANA DE LAS ENTIDADES PERSISTIDAS
 *
 * Single Source of Truth para las entidades que atraviesan el
 * Motor A (persistencia) y el Estrato L4 (API HTTP).
 * =================================================================
 */

pub mod user;
pub mod domain;
pub mod purchase;
pub mod audit;
pub mod idem;
pub mod spend;

pub use audit::AuditLog;
pub use domain::{Domain, DomainStatus};
pub use idem::IdemRecord;
pub use purchase::Purchase;
pub use spend::DailySpend;
pub use user::{ApiKey, User};
