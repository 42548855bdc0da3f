//! The mnemonic key file.
//!
//! A JSON object mapping the contract's bounceable address string to its
//! 24-word phrase, e.g.
//!
//! ```json
//! {
//!     "EQAA…": ["abandon", "abandon", …]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{KeystoreError, KeystoreResult};
use crate::mnemonic::Mnemonic;

/// Key-value persistence for mnemonics, keyed by address.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Open a key store at the given file path.
    ///
    /// The file is created on the first `save`; it does not have to exist
    /// for the store to be constructed.
    pub fn new(path: impl AsRef<Path>) -> Self {
        KeyStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the mnemonic stored for `address`.
    pub fn load(&self, address: &str) -> KeystoreResult<Mnemonic> {
        let entries = self.read_entries()?;
        let words = entries
            .get(address)
            .ok_or_else(|| KeystoreError::MnemonicNotFound(address.to_string()))?;
        Mnemonic::from_words(words)
    }

    /// Store the mnemonic for `address`, replacing any previous entry.
    pub fn save(&self, address: &str, mnemonic: &Mnemonic) -> KeystoreResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(
            address.to_string(),
            mnemonic.words().iter().cloned().collect(),
        );
        let contents = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn read_entries(&self) -> KeystoreResult<BTreeMap<String, Vec<String>>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("mnemonic.json"));

        let mnemonic = Mnemonic::generate();
        store.save("EQtest", &mnemonic).unwrap();

        let loaded = store.load("EQtest").unwrap();
        assert_eq!(loaded.words(), mnemonic.words());
    }

    #[test]
    fn test_missing_address() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("mnemonic.json"));
        assert!(matches!(
            store.load("EQmissing"),
            Err(KeystoreError::MnemonicNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_stored_phrase_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mnemonic.json");
        std::fs::write(&path, r#"{"EQbad": ["not", "a", "phrase"]}"#).unwrap();

        let store = KeyStore::new(&path);
        assert!(matches!(
            store.load("EQbad"),
            Err(KeystoreError::WrongWordCount(3))
        ));
    }

    #[test]
    fn test_save_preserves_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("mnemonic.json"));

        let first = Mnemonic::generate();
        let second = Mnemonic::generate();
        store.save("EQfirst", &first).unwrap();
        store.save("EQsecond", &second).unwrap();

        assert_eq!(store.load("EQfirst").unwrap().words(), first.words());
        assert_eq!(store.load("EQsecond").unwrap().words(), second.words());
    }
}
