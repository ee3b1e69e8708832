//! Authorization Bridge
//!
//! Purchases need the user's explicit approval on a separate device. This
//! module tracks where a chat request is in that lifecycle, talks to the
//! identity provider, and wraps tools that must not run without approval.

pub mod authorized;
pub mod ciba;
pub mod state;

pub use authorized::{with_async_authorization, AsyncAuthorized, AuthorizedTool};
pub use ciba::{CibaClient, CibaError, Credentials};
pub use state::{AuthorizationState, AuthorizationStatus, AuthorizationTracker};
