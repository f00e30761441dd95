//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::credentials::CredentialHasher;
use crate::domain::ports::{GroupRepository, PhoneNumberProvisioner, UserRepository};
use crate::domain::{GroupService, PasswordLoginService, SessionAuthority, UserService};

/// User service over any repository adapter.
pub type Users = UserService<dyn UserRepository>;
/// Group service over any repository adapters.
pub type Groups = GroupService<dyn GroupRepository, dyn UserRepository>;

/// Parameter object bundling the adapters behind the HTTP state.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub provisioner: Arc<dyn PhoneNumberProvisioner>,
    pub hasher: CredentialHasher,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Users,
    pub groups: Groups,
    pub sessions: SessionAuthority,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::credentials::{CredentialHasher, HashingCost, PasswordPolicy};
    /// use backend::domain::ports::FixturePhoneNumberProvisioner;
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use backend::outbound::memory::MemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::default());
    /// let hasher = CredentialHasher::new(PasswordPolicy::default(), HashingCost::default()).unwrap();
    /// let state = HttpState::new(HttpStatePorts {
    ///     users: store.clone(),
    ///     groups: store,
    ///     provisioner: Arc::new(FixturePhoneNumberProvisioner),
    ///     hasher,
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let _users = state.users.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            groups,
            provisioner,
            hasher,
            clock,
        } = ports;
        let login = PasswordLoginService::new(Arc::clone(&users), hasher.clone());
        Self {
            users: UserService::new(Arc::clone(&users), hasher, Arc::clone(&clock)),
            groups: GroupService::new(groups, users, provisioner, clock),
            sessions: SessionAuthority::new(Arc::new(login)),
        }
    }
}
