// ── Session store ───────────────────────────────────────────────────
//
// One authentication session for the whole process, held in a `watch`
// channel so any number of consumers can read a snapshot or subscribe to
// change events. Durable state is two files under a fixed directory;
// absence or corruption of either rehydrates as "logged out".

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, warn};

use rolo_api::{TokenSource, User};

use crate::error::CoreError;

/// Vault entry names. Fixed and versionless: older and newer builds read
/// each other's sessions.
const TOKEN_ENTRY: &str = "auth_token";
const USER_ENTRY: &str = "user_data.json";

/// The authenticated pair. Token and user always travel together.
#[derive(Debug, Clone)]
pub struct Identity {
    pub token: SecretString,
    pub user: User,
}

/// Snapshot of the current session. Empty until login/register succeeds.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    identity: Option<Identity>,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.identity.as_ref().map(|i| &i.token)
    }
}

/// Process-wide session state with durable persistence.
///
/// All transitions go through [`establish`](Self::establish) and
/// [`clear`](Self::clear); reads are cheap snapshots. Implements
/// [`TokenSource`] so the HTTP client picks up the current token at send
/// time -- after a clear, no in-flight or later request can attach the
/// stale token through this store.
pub struct SessionStore {
    state: watch::Sender<AuthSession>,
    vault: SessionVault,
}

impl SessionStore {
    /// Open the store, rehydrating from the vault.
    ///
    /// Both vault entries must exist and parse; anything less starts the
    /// store logged out. A corrupt vault is not an error.
    pub fn open(state_dir: PathBuf) -> Self {
        let vault = SessionVault { dir: state_dir };
        let identity = vault.load();
        if identity.is_some() {
            debug!("session rehydrated from vault");
        }
        let (state, _) = watch::channel(AuthSession { identity });
        Self { state, vault }
    }

    /// Synchronous snapshot of the in-memory state.
    pub fn current(&self) -> AuthSession {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Persist a new identity, then swap it into memory.
    ///
    /// Persistence failure fails the transition and leaves the in-memory
    /// state untouched.
    pub(crate) fn establish(&self, token: SecretString, user: User) -> Result<(), CoreError> {
        let identity = Identity { token, user };
        self.vault.store(&identity)?;
        self.state.send_replace(AuthSession {
            identity: Some(identity),
        });
        Ok(())
    }

    /// Clear the session unconditionally. Never fails: vault I/O problems
    /// are logged and the in-memory state is emptied regardless.
    pub fn clear(&self) {
        self.vault.clear();
        self.state.send_replace(AuthSession::default());
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.state.borrow().identity.as_ref().map(|i| i.token.clone())
    }
}

// ── Durable vault ───────────────────────────────────────────────────

struct SessionVault {
    dir: PathBuf,
}

impl SessionVault {
    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_ENTRY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_ENTRY)
    }

    /// Load the identity if, and only if, both entries are intact.
    fn load(&self) -> Option<Identity> {
        let token = std::fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let user_json = std::fs::read_to_string(self.user_path()).ok()?;
        let user: User = serde_json::from_str(&user_json).ok()?;
        Some(Identity {
            token: SecretString::from(token.to_owned()),
            user,
        })
    }

    fn store(&self, identity: &Identity) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.token_path(), identity.token.expose_secret())?;
        let user_json = serde_json::to_string(&identity.user)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(self.user_path(), user_json)?;
        Ok(())
    }

    fn clear(&self) {
        for path in [self.token_path(), self.user_path()] {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove session entry {}: {e}", path.display());
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 42,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Some("ada@example.com".into()),
            phone_number: None,
            active: true,
        }
    }

    #[test]
    fn starts_logged_out_with_empty_vault() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());
        assert!(store.bearer_token().is_none());
    }

    #[test]
    fn establish_persists_and_rehydrates() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SessionStore::open(dir.path().to_path_buf());
            store
                .establish(SecretString::from("jwt-abc"), test_user())
                .unwrap();
            assert!(store.is_authenticated());
        }

        // Fresh process: state comes back from the vault.
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(store.is_authenticated());
        let session = store.current();
        assert_eq!(session.user().unwrap().id, 42);
        assert_eq!(
            session.token().unwrap().expose_secret(),
            "jwt-abc"
        );
    }

    #[test]
    fn clear_removes_both_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().to_path_buf());
        store
            .establish(SecretString::from("jwt-abc"), test_user())
            .unwrap();

        store.clear();
        assert!(!store.is_authenticated());
        assert!(!dir.path().join(TOKEN_ENTRY).exists());
        assert!(!dir.path().join(USER_ENTRY).exists());

        // Next process start sees the logged-out state.
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn partial_vault_rehydrates_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_ENTRY), "jwt-abc").unwrap();
        // No user entry.
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn corrupt_user_entry_rehydrates_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_ENTRY), "jwt-abc").unwrap();
        std::fs::write(dir.path().join(USER_ENTRY), "{not json").unwrap();
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn subscribers_see_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().to_path_buf());
        let rx = store.subscribe();

        store
            .establish(SecretString::from("jwt-abc"), test_user())
            .unwrap();
        assert!(rx.borrow().is_authenticated());

        store.clear();
        assert!(!rx.borrow().is_authenticated());
    }
}
