//! Outbound adapters implementing the domain repository ports.
//!
//! - **persistence**: PostgreSQL repositories built on Diesel.
//! - **memory**: a locked in-process store for development and tests.
//!
//! Adapters translate between domain types and storage rows and carry no
//! business rules beyond the uniqueness guarantees of their indexes.

pub mod memory;
pub mod persistence;
