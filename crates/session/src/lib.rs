//! Session store capability.
//!
//! Authenticated components receive a [`SessionStore`] instead of
//! reaching into global storage, so tests can swap in
//! [`MemorySessionStore`].

mod file;
mod memory;

use std::ffi::OsString;
use std::path::PathBuf;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Well-known keys.
pub mod keys {
    /// Bearer token for authenticated API calls.
    pub const ACCESS_TOKEN: &str = "token";
    /// Serialized profile of the signed-in user.
    pub const USER_INFO: &str = "userInfo";
}

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value storage for session state.
pub trait SessionStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<(), SessionError>;
}

/// Returns the default session file path.
pub fn default_session_path() -> Option<PathBuf> {
    lago_config_dir().map(|d| d.join("session.json"))
}

/// Returns the per-user Lago directory, `<config home>/lago`.
pub fn lago_config_dir() -> Option<PathBuf> {
    config_home(|name| std::env::var_os(name)).map(|d| d.join("lago"))
}

/// Resolves the config home through `env`.
///
/// A non-empty `XDG_CONFIG_HOME` wins on every platform, then `APPDATA`
/// on Windows, then `$HOME/.config`.
fn config_home(env: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let var = |name: &str| env(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    var("XDG_CONFIG_HOME")
        .or_else(|| if cfg!(windows) { var("APPDATA") } else { None })
        .or_else(|| var("HOME").map(|home| home.join(".config")))
}
