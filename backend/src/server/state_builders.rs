//! Builders selecting the repository adapters behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use backend::domain::ports::{FixturePhoneNumberProvisioner, GroupRepository, UserRepository};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::memory::MemoryStore;
use backend::outbound::persistence::{DbPool, DieselGroupRepository, DieselUserRepository};

use super::ServerConfig;

/// Repository pair for one storage backend.
fn build_repositories(
    pool: Option<&DbPool>,
) -> (Arc<dyn UserRepository>, Arc<dyn GroupRepository>) {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            (
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselGroupRepository::new(pool.clone())),
            )
        }
        None => {
            warn!("no database configured; users and groups are kept in memory");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    }
}

/// Handler state for `config`.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (users, groups) = build_repositories(config.db_pool.as_ref());
    web::Data::new(HttpState::new(HttpStatePorts {
        users,
        groups,
        provisioner: Arc::new(FixturePhoneNumberProvisioner),
        hasher: config.hasher.clone(),
        clock: Arc::new(DefaultClock),
    }))
}
