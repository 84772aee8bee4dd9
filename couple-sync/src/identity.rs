//! Identity of the signed-in user.

use couple_types::Identity;
use std::sync::RwLock;

/// Supplies the current user's identity.
///
/// The identity is stable across restarts once set and `None` while the
/// user is signed out. Remote writes and reads are skipped without one.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Identity that is set explicitly, e.g. from a command-line flag.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    identity: RwLock<Option<Identity>>,
}

impl StaticIdentity {
    /// Creates a provider. Empty identities count as signed out.
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity: RwLock::new(identity.filter(|id| !id.is_empty())),
        }
    }

    /// Creates a signed-in provider.
    pub fn signed_in(identity: impl Into<Identity>) -> Self {
        Self::new(Some(identity.into()))
    }

    /// Replaces the identity. `None` signs out.
    pub fn set(&self, identity: Option<Identity>) {
        if let Ok(mut guard) = self.identity.write() {
            *guard = identity.filter(|id| !id.is_empty());
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.read().ok().and_then(|guard| guard.clone())
    }
}
