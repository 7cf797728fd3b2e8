//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **email**: HTTP email provider implementing the notifier port
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod email;
pub mod persistence;
