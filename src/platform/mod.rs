//! Injected platform capabilities.
//!
//! The client never probes its environment. Persistent key-value storage
//! and navigation are handed to it at construction time:
//!
//! - [`KeyValueStore`] holds the bearer token, refresh token and cached
//!   user. [`MemoryStore`] (default), [`FileStore`] and [`NoopStore`].
//! - [`Navigator`] is told to go to the login route on a 401.
//!   [`MemoryNavigator`] tracks a current path in memory; [`NoopNavigator`]
//!   only logs.

mod storage;

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::Result;

pub use storage::{FileStore, MemoryStore, NoopStore};

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth-token";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh-token";
/// Storage key of the JSON-encoded signed-in user.
pub const USER_KEY: &str = "user";

/// Default route the client redirects to on 401.
pub const DEFAULT_LOGIN_ROUTE: &str = "/auth/login";

/// Persistent string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Client-side navigation.
pub trait Navigator: Send + Sync {
    /// Path currently displayed.
    fn current_path(&self) -> String;

    fn navigate_to(&self, path: &str);
}

/// Navigator for headless use: remembers where it was sent.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    current: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current: initial.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Paths navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    fn navigate_to(&self, path: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = path.to_string();
        state.history.push(path.to_string());
    }
}

/// Navigator with nowhere to go. Logs the redirect and stays put.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn navigate_to(&self, path: &str) {
        info!(path, "navigation requested without a navigator");
    }
}
