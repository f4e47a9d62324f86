use std::{
    io,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use crate::error::ApiError;

/// Where a session token survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;

    fn save(&self, token: &str) -> io::Result<()>;

    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore;

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, _token: &str) -> io::Result<()> {
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();

                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// The one place the credential token lives.
///
/// Cloning is cheap and every clone sees the same token, so the session can be
/// handed to the client factory and to the guard at the same time.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    token: RwLock<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Opens a session, picking up a token left behind by an earlier run.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(err = %err, "unable to read stored token, starting signed out");

                None
            }
        };

        Self {
            inner: Arc::new(Inner {
                token: RwLock::new(token),
                store: Box::new(store),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore)
    }

    pub fn token(&self) -> Option<String> {
        match self.inner.token.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.token().is_some()
    }

    #[tracing::instrument(skip(self, token), err)]
    pub fn login(&self, token: impl Into<String>) -> Result<(), ApiError> {
        let token = token.into();

        self.inner
            .store
            .save(&token)
            .map_err(|err| ApiError::Session(err.to_string()))?;

        self.replace(Some(token));

        tracing::info!("session started");

        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub fn logout(&self) -> Result<(), ApiError> {
        self.replace(None);

        self.inner
            .store
            .clear()
            .map_err(|err| ApiError::Session(err.to_string()))?;

        tracing::info!("session ended");

        Ok(())
    }

    /// Called by the pipeline when the backend answers 401.
    pub fn on_unauthorized(&self) {
        tracing::warn!("backend rejected the credential, dropping it");

        self.replace(None);

        if let Err(err) = self.inner.store.clear() {
            tracing::error!(err = %err, "unable to clear stored token");
        }
    }

    fn replace(&self, token: Option<String>) {
        match self.inner.token.write() {
            Ok(mut slot) => *slot = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storyadmin-{}-{}", name, std::process::id()))
    }

    #[test]
    fn login_then_logout() {
        let session = Session::in_memory();
        assert!(!session.is_present());

        session.login("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.logout().unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn clones_share_the_token() {
        let session = Session::in_memory();
        let other = session.clone();

        session.login("abc").unwrap();
        assert!(other.is_present());

        other.on_unauthorized();
        assert!(!session.is_present());
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = scratch("reopen");

        let session = Session::new(FileTokenStore::new(&path));
        session.login("persisted\n").unwrap();

        let reopened = Session::new(FileTokenStore::new(&path));
        assert_eq!(reopened.token().as_deref(), Some("persisted"));

        reopened.on_unauthorized();
        assert!(!path.exists());
        assert!(!Session::new(FileTokenStore::new(&path)).is_present());
    }

    #[test]
    fn missing_file_means_signed_out() {
        let store = FileTokenStore::new(scratch("missing"));

        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }
}
