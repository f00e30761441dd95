//! Port for acquiring a phone number to attach to a group.

use async_trait::async_trait;

use crate::domain::Group;

use super::define_port_error;

/// Number proposed by [`FixturePhoneNumberProvisioner`].
pub const PLACEHOLDER_PHONE_NUMBER: &str = "+18705251963";

define_port_error! {
    /// Errors raised while proposing a number.
    pub enum PhoneNumberProvisionerError {
        /// The upstream number pool could not be reached.
        Unavailable { message: String } => "phone number provisioning unavailable: {message}",
    }
}

/// Proposes a phone number for a group.
///
/// The caller is responsible for checking that the proposal is not already
/// assigned before persisting it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhoneNumberProvisioner: Send + Sync {
    /// Propose a number for `group`.
    async fn propose(&self, group: &Group) -> Result<String, PhoneNumberProvisionerError>;
}

/// Provisioner that always proposes [`PLACEHOLDER_PHONE_NUMBER`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePhoneNumberProvisioner;

#[async_trait]
impl PhoneNumberProvisioner for FixturePhoneNumberProvisioner {
    async fn propose(&self, _group: &Group) -> Result<String, PhoneNumberProvisionerError> {
        Ok(PLACEHOLDER_PHONE_NUMBER.to_owned())
    }
}
