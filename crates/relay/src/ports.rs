//! Port trait definitions.
//!
//! This crate defines *what* it needs from the outside world; the adapter
//! crates define *how* it is supplied. Both ports are `async` because they sit
//! on the invocation's only two suspension points — the mapping fetch and the
//! webhook post — which are awaited strictly in that order, never concurrently.

use async_trait::async_trait;

use crate::errors::RelayError;
use crate::message::NotificationMessage;
use crate::resolve::IdentityMapping;

/// Supplies the login → Slack-identity mapping for this invocation.
///
/// Implementations fetch and parse the mapping file; failures must surface as
/// [`RelayError::MappingLoadFailure`] so the error path can report them.
#[async_trait]
pub trait MappingSource: Send + Sync {
    async fn load_mapping(&self) -> Result<IdentityMapping, RelayError>;
}

/// Delivers one rendered notification to the destination platform.
///
/// Implementations make exactly one transport attempt per call; retry policy
/// is deliberately absent from this system.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), RelayError>;
}
