//! Diesel/PostgreSQL persistence adapters.
//!
//! Membership arrays are updated with single `UPDATE` statements so each side
//! of a membership write is atomic on its own row.

mod diesel_error_mapping;
mod diesel_group_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
