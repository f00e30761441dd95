//! Backend library modules.
//!
//! `domain` holds the user, group, credential and session core; `inbound`
//! exposes it over HTTP; `outbound` stores it in PostgreSQL or memory.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use domain::TraceId;
pub use middleware::Trace;
