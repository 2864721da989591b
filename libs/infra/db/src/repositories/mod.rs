// [libs/infra/db/src/repositories/mod.rs]
pub mod audit;
pub mod domains;
pub mod idem;
pub mod purchases;
pub mod spend;
pub mod users;

pub use audit::AuditRepository;
pub use domains::DomainRepository;
pub use idem::IdemRepository;
pub use purchases::PurchaseRepository;
pub use spend::SpendRepository;
pub use users::UserRepository;
