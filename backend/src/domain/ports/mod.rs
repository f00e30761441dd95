//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod group_repository;
mod login_service;
mod phone_number_provisioner;
mod session_store;
mod user_repository;

#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupPersistenceError, GroupRepository};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use phone_number_provisioner::MockPhoneNumberProvisioner;
pub use phone_number_provisioner::{
    FixturePhoneNumberProvisioner, PLACEHOLDER_PHONE_NUMBER, PhoneNumberProvisioner,
    PhoneNumberProvisionerError,
};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
