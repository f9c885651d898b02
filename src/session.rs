//! Process-wide session storage.
//!
//! The credential and the role flag live in a small key-value store that both
//! the navigation [`Guard`](crate::Guard) and the request middleware read.
//! Login and logout flows write it; so does the middleware when the server
//! answers 401.
//!
//! Two stores ship with the crate:
//!
//! | Store | Durability | Use |
//! |---|---|---|
//! | [`MemorySession`] | process lifetime | tests, short-lived tools |
//! | [`FileSession`] | survives restarts | desktop / CLI clients |

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::error::Error;

/// Key holding the opaque bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Key holding the role flag.
pub const ROLE_KEY: &str = "isAdmin";

/// Role flag value that marks an administrator session. Anything else,
/// including absence, is a standard session.
pub const ADMIN_ROLE: &str = "1";

const STANDARD_ROLE: &str = "0";

// ── SessionStore ──────────────────────────────────────────────────────────────

/// Key-value persistence for session state.
///
/// Writes are infallible from the caller's point of view. A store that can
/// fail underneath (disk, keychain) reports the failure itself and keeps its
/// in-memory view authoritative.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Stores a freshly issued credential and the role flag that came with it.
pub fn sign_in(store: &dyn SessionStore, token: &str, is_admin: bool) {
    store.set(TOKEN_KEY, token);
    store.set(ROLE_KEY, if is_admin { ADMIN_ROLE } else { STANDARD_ROLE });
}

/// Forgets the credential and the role flag.
pub fn sign_out(store: &dyn SessionStore) {
    store.remove(TOKEN_KEY);
    store.remove(ROLE_KEY);
}

// ── Session snapshot ──────────────────────────────────────────────────────────

/// The session as read at one instant.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<String>,
}

impl Session {
    /// Reads both keys. An empty token counts as no token.
    pub fn read(store: &dyn SessionStore) -> Self {
        Self {
            token: store.get(TOKEN_KEY).filter(|t| !t.is_empty()),
            role: store.get(ROLE_KEY),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

// ── MemorySession ─────────────────────────────────────────────────────────────

/// In-memory store. Cheap to construct, forgets everything on drop.
#[derive(Debug, Default)]
pub struct MemorySession {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, mostly for tests.
    pub fn with<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries.into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self { entries: Mutex::new(entries) }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

// ── FileSession ───────────────────────────────────────────────────────────────

/// A store persisted as a flat JSON object on disk.
///
/// Every write rewrites the file through a temporary sibling that is renamed
/// into place, so a crash mid-write leaves the previous file intact. A write
/// that fails is logged and the
/// in-memory value stands; the next successful write catches the file up.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileSession {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(raw) if raw.is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut entries);
        if let Err(e) = self.persist(&entries) {
            warn!(path = %self.path.display(), "failed to persist session: {e}");
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), Error> {
        let raw = serde_json::to_vec_pretty(entries)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&raw)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStore for FileSession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| {
            entries.remove(key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_then_out() {
        let store = MemorySession::new();

        sign_in(&store, "abc", true);
        let session = Session::read(&store);
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert!(session.is_admin());

        sign_out(&store);
        assert_eq!(Session::read(&store), Session::default());
    }

    #[test]
    fn standard_sign_in_is_not_admin() {
        let store = MemorySession::new();
        sign_in(&store, "abc", false);
        assert_eq!(store.get(ROLE_KEY).as_deref(), Some("0"));
        assert!(!Session::read(&store).is_admin());
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let store = MemorySession::with([(TOKEN_KEY, "")]);
        assert!(!Session::read(&store).has_token());
    }

    #[test]
    fn only_literal_one_is_admin() {
        for role in ["0", "true", "admin", " 1", ""] {
            let store = MemorySession::with([(TOKEN_KEY, "t"), (ROLE_KEY, role)]);
            assert!(!Session::read(&store).is_admin(), "role {role:?}");
        }
    }

    #[test]
    fn file_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSession::open(&path).unwrap();
        sign_in(&store, "abc", true);
        drop(store);

        let reopened = FileSession::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(reopened.get(ROLE_KEY).as_deref(), Some("1"));

        reopened.remove(TOKEN_KEY);
        let again = FileSession::open(&path).unwrap();
        assert_eq!(again.get(TOKEN_KEY), None);
    }

    #[test]
    fn writes_replace_the_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, br#"{"token":"old"}"#).unwrap();

        let store = FileSession::open(&path).unwrap();
        sign_in(&store, "new", false);
        store.remove(ROLE_KEY);

        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["session.json"]);

        let on_disk: HashMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get(TOKEN_KEY).map(String::as_str), Some("new"));
        assert!(!on_disk.contains_key(ROLE_KEY));
    }

    #[test]
    fn unwritable_directory_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("session.json");

        let store = FileSession::open(&path).unwrap();
        sign_in(&store, "abc", false);

        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(FileSession::open(&path), Err(Error::SessionFormat(_))));
    }
}
