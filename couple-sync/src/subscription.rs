//! Registration for remote change notifications.
//!
//! A device subscribes to the record of its active invite code so it hears
//! about the partner's writes, and drops the subscription when it unlinks.
//! The collaborator is injected into the session instead of living as a
//! process-wide singleton.

use crate::error::SyncResult;
use crate::invite;
use async_trait::async_trait;
use std::sync::Mutex;

/// Remote change-notification registration.
#[async_trait]
pub trait ChangeSubscriptions: Send + Sync {
    /// Subscribes to changes of the record for `code`, replacing any
    /// previous subscription. `None` removes the current one.
    async fn subscribe(&self, code: Option<&str>) -> SyncResult<()>;
}

/// Subscription id for a code: `prefix` followed by the record key.
/// `None` for codes with an empty key.
pub fn subscription_id(prefix: &str, code: &str) -> Option<String> {
    let key = invite::record_key(code);
    (!key.is_empty()).then(|| format!("{prefix}{key}"))
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSubscriptions;

#[async_trait]
impl ChangeSubscriptions for NoopSubscriptions {
    async fn subscribe(&self, _code: Option<&str>) -> SyncResult<()> {
        Ok(())
    }
}

/// Keeps the active subscription id in memory.
#[derive(Debug)]
pub struct LocalSubscriptions {
    prefix: String,
    active: Mutex<Option<String>>,
}

impl LocalSubscriptions {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            active: Mutex::new(None),
        }
    }

    /// The id of the current subscription.
    pub fn active(&self) -> Option<String> {
        self.active.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChangeSubscriptions for LocalSubscriptions {
    async fn subscribe(&self, code: Option<&str>) -> SyncResult<()> {
        let next = code.and_then(|code| subscription_id(&self.prefix, code));
        if let Ok(mut active) = self.active.lock() {
            *active = next;
        }
        Ok(())
    }
}
