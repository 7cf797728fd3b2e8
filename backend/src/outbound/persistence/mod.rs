//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Lifecycle rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic history**: a transport row and the history row describing its
//!   phase change are written in one transaction.
//!
//! # Example
//!
//! ```no_run
//! use tracker_backend::outbound::persistence::{
//!     DbPool, DieselTransportRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://tracker@localhost/tracker";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let transports = DieselTransportRepository::new(pool);
//! # let _ = transports;
//! # Ok(())
//! # }
//! ```

mod diesel_admin_repository;
mod diesel_error_mapping;
mod diesel_phase_repository;
mod diesel_transport_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_repository::DieselAdminRepository;
pub use diesel_phase_repository::DieselPhaseRepository;
pub use diesel_transport_repository::DieselTransportRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
