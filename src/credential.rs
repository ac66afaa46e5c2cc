//! Access token for the generation service and its local persistence.
//!
//! The token lives in one named slot of a small JSON file under the user's
//! config directory. It is read once at startup and written only by an
//! explicit save.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::CredentialError;

/// Slot name the token is stored under.
pub const CREDENTIAL_SLOT: &str = "gemini-api-key";

/// Opaque, non-empty access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/briefboard/credentials.json`.
    pub fn default_location() -> Result<Self, CredentialError> {
        let dir = dirs::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::new(dir.join("briefboard").join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token. A missing file or empty slot is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Credential>, CredentialError> {
        let slots = match self.read_slots() {
            Ok(slots) => slots,
            Err(CredentialError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        Ok(slots.get(CREDENTIAL_SLOT).cloned().and_then(Credential::new))
    }

    /// Saves the token, keeping any other slots in the file.
    pub fn save(&self, token: &str) -> Result<Credential, CredentialError> {
        let credential = Credential::new(token).ok_or(CredentialError::Empty)?;

        let mut slots = match self.read_slots() {
            Ok(slots) => slots,
            Err(CredentialError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(CREDENTIAL_SLOT.to_string(), credential.expose().to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&slots)?)?;
        tracing::info!(path = %self.path.display(), "Saved API key");
        Ok(credential)
    }

    fn read_slots(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let raw = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_rejected() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("  \n").is_none());
        assert_eq!(Credential::new(" abc ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_hides_token() {
        let credential = Credential::new("secret-token").unwrap();
        assert!(!format!("{:?}", credential).contains("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("credentials.json"));

        let saved = store.save("AIza-test").unwrap();
        assert_eq!(saved.expose(), "AIza-test");
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn test_save_rejects_blank_and_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save("first").unwrap();

        assert!(matches!(store.save("   "), Err(CredentialError::Empty)));
        assert_eq!(store.load().unwrap().unwrap().expose(), "first");
    }

    #[test]
    fn test_save_preserves_other_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"other-service": "keep-me"}"#).unwrap();

        let store = CredentialStore::new(&path);
        store.save("new-key").unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw.get("other-service").map(String::as_str), Some("keep-me"));
        assert_eq!(raw.get(CREDENTIAL_SLOT).map(String::as_str), Some("new-key"));
    }
}
