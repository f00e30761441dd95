//! Inbound adapters (driving side): HTTP handlers that translate requests
//! into domain service calls.

pub mod http;
