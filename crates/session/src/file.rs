use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::{SessionError, SessionStore};

/// Persistent session store.
///
/// Values are cached in memory and persisted to a JSON file on every write.
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Creates a store, loading existing values from disk.
    pub fn new(path: PathBuf) -> Result<Self, SessionError> {
        let values = read_session(&path)?;
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the backing file from the in-memory values.
    ///
    /// Writes a sibling temp file, then renames it over the target.
    fn persist(&self) -> Result<(), SessionError> {
        let json = {
            let map = self.values.read().unwrap_or_else(|e| e.into_inner());
            serde_json::to_vec_pretty(&*map)?
        };

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;

        // The file holds the bearer token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = json.len(), "session saved");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        {
            let mut map = self.values.write().unwrap_or_else(|e| e.into_inner());
            map.insert(key.to_string(), value.to_string());
        }
        self.persist()
    }

    fn clear(&self, key: &str) -> Result<(), SessionError> {
        {
            let mut map = self.values.write().unwrap_or_else(|e| e.into_inner());
            if map.remove(key).is_none() {
                return Ok(());
            }
        }
        self.persist()
    }
}

/// Reads the session file. A missing or empty file is an empty session.
fn read_session(path: &Path) -> Result<HashMap<String, String>, SessionError> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(HashMap::new());
    }
    let values: HashMap<String, String> = serde_json::from_slice(&raw)?;
    debug!(path = %path.display(), keys = values.len(), "session loaded");
    Ok(values)
}
