//! Encrypted file-backed store
//!
//! Values are kept as one JSON map encrypted with AES-256-GCM in
//! ~/.config/irecommend/store.enc. The file layout is `nonce || ciphertext`.
//! The key is derived from machine-specific identifiers.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};
use crate::paths;

const NONCE_SIZE: usize = 12;

/// Key-value store persisted to an encrypted file
pub struct EncryptedFileStore {
    path: PathBuf,
    key: [u8; 32],
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStore {
    /// Open the store at the default location with the machine-derived key
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::open(paths::store_path()?))
    }

    /// Open a store at `path` with the machine-derived key
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, derive_key())
    }

    /// Open a store at `path` with an explicit key
    pub fn with_key(path: impl Into<PathBuf>, key: [u8; 32]) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher(&self) -> Result<Aes256Gcm, StorageError> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|e| StorageError::Crypto(e.to_string()))
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let encrypted = fs::read(&self.path)?;
        if encrypted.len() < NONCE_SIZE {
            tracing::warn!("Store file {} is truncated, ignoring it", self.path.display());
            return Ok(HashMap::new());
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| StorageError::Crypto("failed to decrypt store".to_string()))?;

        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Current map for a write; an unreadable file is moved aside and replaced
    fn load_for_write(&self) -> Result<HashMap<String, String>, StorageError> {
        match self.load() {
            Err(err @ (StorageError::Crypto(_) | StorageError::Json(_))) => {
                let backup = self.path.with_extension("enc.bak");
                tracing::warn!(
                    "Store file {} is unreadable ({err}), moving it to {}",
                    self.path.display(),
                    backup.display()
                );
                fs::rename(&self.path, &backup)?;
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(values)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), json.as_slice())
            .map_err(|_| StorageError::Crypto("failed to encrypt store".to_string()))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);
        fs::write(&self.path, output)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl KeyValueStore for EncryptedFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.load_for_write()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Best-effort machine identifier for key derivation
fn machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = fs::read_to_string(candidate) {
                let id = id.trim();
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(uuid) = stdout
                .lines()
                .find(|line| line.contains("IOPlatformUUID"))
                .and_then(|line| line.split('"').nth(3))
            {
                return Some(uuid.to_string());
            }
        }
    }

    None
}

/// Derive the store key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();

    if let Some(id) = machine_id() {
        hasher.update(id.as_bytes());
    }
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"irecommend-store-v1");

    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SESSION_TOKEN_KEY, THEME_MODE_KEY};
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.enc");

        let store = EncryptedFileStore::with_key(&path, [7u8; 32]);
        store.set(SESSION_TOKEN_KEY, "tok-123").unwrap();
        store.set(THEME_MODE_KEY, "light").unwrap();

        let reopened = EncryptedFileStore::with_key(&path, [7u8; 32]);
        assert_eq!(reopened.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));
        assert_eq!(reopened.get(THEME_MODE_KEY).unwrap().as_deref(), Some("light"));

        reopened.remove(SESSION_TOKEN_KEY).unwrap();
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(THEME_MODE_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_file_is_not_plaintext() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.enc");

        let store = EncryptedFileStore::with_key(&path, [1u8; 32]);
        store.set(SESSION_TOKEN_KEY, "very-secret-token").unwrap();

        let raw = fs::read(&path).unwrap();
        let needle = b"very-secret-token";
        assert!(!raw.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_wrong_key_fails_to_decrypt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.enc");

        EncryptedFileStore::with_key(&path, [1u8; 32])
            .set(THEME_MODE_KEY, "dark")
            .unwrap();

        let other = EncryptedFileStore::with_key(&path, [2u8; 32]);
        assert!(matches!(other.get(THEME_MODE_KEY), Err(StorageError::Crypto(_))));
    }

    #[test]
    fn test_write_recovers_from_unreadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.enc");

        EncryptedFileStore::with_key(&path, [1u8; 32])
            .set(THEME_MODE_KEY, "light")
            .unwrap();

        let rekeyed = EncryptedFileStore::with_key(&path, [2u8; 32]);
        rekeyed.set(SESSION_TOKEN_KEY, "tok").unwrap();
        assert_eq!(rekeyed.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert_eq!(rekeyed.get(THEME_MODE_KEY).unwrap(), None);
        assert!(path.with_extension("enc.bak").exists());

        fs::write(&path, b"0123456789abcdef-not-a-store").unwrap();
        rekeyed.remove(SESSION_TOKEN_KEY).unwrap();
        rekeyed.set(THEME_MODE_KEY, "dark").unwrap();
        assert_eq!(rekeyed.get(THEME_MODE_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::with_key(dir.path().join("absent.enc"), [0u8; 32]);
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap(), None);
        store.remove(SESSION_TOKEN_KEY).unwrap();
        assert!(!store.path().exists());
    }
}
