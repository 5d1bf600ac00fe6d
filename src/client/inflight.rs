//! In-flight GET de-duplication.
//!
//! Concurrent GETs with the same [`RequestKey`] share one dispatch. The
//! registry maps each key to a weak handle on a [`Shared`] future; the
//! first caller installs it, later callers upgrade the handle and await
//! the same result.
//!
//! The registry never keeps a dispatch alive on its own. The dispatch
//! future owns an [`InflightGuard`] that removes the entry when the
//! dispatch settles, or when every waiter has dropped it. Each entry
//! carries a generation id so a stale guard never removes a newer entry
//! for the same key.
//!
//! Entries also remember the cache epoch they started under. A caller
//! arriving under a later epoch does not join an older dispatch; it starts
//! its own, which replaces the registry entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared, WeakShared};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{ApiResponse, RequestKey};

/// Outcome every waiter of a dispatch observes.
pub(crate) type DispatchResult = std::result::Result<ApiResponse<Value>, ApiError>;

pub(crate) type SharedDispatch = Shared<BoxFuture<'static, DispatchResult>>;

struct Slot {
    id: u64,
    epoch: u64,
    dispatch: WeakShared<BoxFuture<'static, DispatchResult>>,
}

/// Registry of outstanding GET dispatches.
#[derive(Default)]
pub struct InflightRegistry {
    slots: Mutex<HashMap<RequestKey, Slot>>,
    next_id: AtomicU64,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<RequestKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the dispatch outstanding for `key` under `epoch`, or start one
    /// with `start`.
    ///
    /// Lookup and installation happen under one lock acquisition. `start`
    /// receives the guard the new dispatch must hold until it settles; it
    /// is called with the lock held and must only build the future, not
    /// poll it. Returns the shared dispatch and whether it was joined.
    pub(crate) fn join_or_start<F>(
        self: &Arc<Self>,
        key: RequestKey,
        epoch: u64,
        start: F,
    ) -> (SharedDispatch, bool)
    where
        F: FnOnce(InflightGuard) -> BoxFuture<'static, DispatchResult>,
    {
        let mut slots = self.slots();
        if let Some(existing) = slots
            .get(&key)
            .filter(|slot| slot.epoch == epoch)
            .and_then(|slot| slot.dispatch.upgrade())
        {
            return (existing, true);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = InflightGuard {
            registry: Arc::clone(self),
            key: key.clone(),
            id,
        };
        let shared = start(guard).shared();
        if let Some(dispatch) = shared.downgrade() {
            slots.insert(key, Slot { id, epoch, dispatch });
        }
        (shared, false)
    }

    /// Number of dispatches currently registered.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.slots().contains_key(key)
    }
}

/// Removes its registry entry on drop.
pub(crate) struct InflightGuard {
    registry: Arc<InflightRegistry>,
    key: RequestKey,
    id: u64,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let mut slots = self.registry.slots();
        if slots.get(&self.key).is_some_and(|slot| slot.id == self.id) {
            slots.remove(&self.key);
        }
    }
}
