//! Per-request authorization lifecycle tracking.
//!
//! Two holders are kept side by side: the bridge state written by the
//! asynchronous authorization wrapper, and the checkout flag written by the
//! checkout tools once they hold credentials. [`AuthorizationTracker::snapshot`]
//! reconciles them.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    #[default]
    Idle,
    Requested,
    Pending,
    Approved,
    Denied,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::Idle => "idle",
            AuthorizationStatus::Requested => "requested",
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Approved => "approved",
            AuthorizationStatus::Denied => "denied",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    pub status: AuthorizationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthorizationState {
    pub fn new(status: AuthorizationStatus, message: Option<String>) -> Self {
        Self { status, message }
    }
}

/// Authorization state for a single chat request.
#[derive(Debug, Default)]
pub struct AuthorizationTracker {
    bridge: Mutex<AuthorizationState>,
    checkout: Mutex<Option<AuthorizationState>>,
}

impl AuthorizationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts the bridge back to idle and forgets the checkout flag.
    pub fn reset(&self) {
        *lock(&self.bridge) = AuthorizationState::default();
        *lock(&self.checkout) = None;
    }

    /// A confirmation request was sent with `binding_message`.
    pub fn request(&self, binding_message: impl Into<String>) {
        *lock(&self.bridge) = AuthorizationState::new(
            AuthorizationStatus::Requested,
            Some(binding_message.into()),
        );
    }

    /// The user has not answered yet. Keeps the binding message.
    pub fn mark_pending(&self) {
        let mut bridge = lock(&self.bridge);
        if bridge.status == AuthorizationStatus::Requested {
            bridge.status = AuthorizationStatus::Pending;
        }
    }

    pub fn deny(&self, message: impl Into<String>) {
        *lock(&self.bridge) =
            AuthorizationState::new(AuthorizationStatus::Denied, Some(message.into()));
    }

    /// Called by a checkout tool that received an access token.
    pub fn approve_checkout(&self) {
        *lock(&self.checkout) = Some(AuthorizationState::new(AuthorizationStatus::Approved, None));
    }

    pub fn checkout_state(&self) -> Option<AuthorizationState> {
        lock(&self.checkout).clone()
    }

    /// Returns the bridge state, first promoting an outstanding request to
    /// approved when the checkout side already holds credentials.
    pub fn snapshot(&self) -> AuthorizationState {
        let checkout_approved = lock(&self.checkout)
            .as_ref()
            .is_some_and(|s| s.status == AuthorizationStatus::Approved);

        let mut bridge = lock(&self.bridge);
        if checkout_approved
            && matches!(
                bridge.status,
                AuthorizationStatus::Requested | AuthorizationStatus::Pending
            )
        {
            bridge.status = AuthorizationStatus::Approved;
        }
        bridge.clone()
    }
}

// A poisoned lock only means another tool call panicked mid-update; the
// state itself is always a complete value.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
