// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use pki::{CertificateChain, DecodeError, KeyLoadError, KeyPair, PemDecodable};

use crate::config::ResponderConfig;
use crate::token_chain::{CryptoTokenAndChain, TokenChainError};

const CHAIN_FILE: &str = "chain.pem";
const KEY_FILE: &str = "ca.priv";

/// The authoritative source of CA signing material, consulted only on
/// cache reload, never per request.
pub trait CaStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<CryptoTokenAndChain>, CaStoreError>;
}

/// Loads CAs from a directory with one subdirectory per CA, each holding
/// the CA's leaf-to-root `chain.pem` and its encrypted `ca.priv` keypair.
pub struct DirectoryCaStore {
    root: PathBuf,
    passphrase: String,
}

impl DirectoryCaStore {
    pub fn new(root: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Reads the key passphrase from the file named in the config.
    pub fn from_config(config: &ResponderConfig) -> Result<Self, CaStoreError> {
        let passphrase = fs::read_to_string(&config.ca_key_passphrase_file).map_err(|source| {
            CaStoreError::Io {
                path: config.ca_key_passphrase_file.clone(),
                source,
            }
        })?;
        Ok(Self::new(&config.ca_store_dir, passphrase.trim()))
    }

    fn load_ca(&self, dir: &Path, name: &str) -> Result<CryptoTokenAndChain, CaStoreError> {
        let chain_path = dir.join(CHAIN_FILE);
        let chain_pem = fs::read(&chain_path).map_err(|source| CaStoreError::Io {
            path: chain_path.clone(),
            source,
        })?;
        let chain =
            CertificateChain::from_pem(chain_pem).map_err(|source| CaStoreError::ChainDecode {
                path: chain_path,
                source,
            })?;

        let key_path = dir.join(KEY_FILE);
        let key_pem = fs::read(&key_path).map_err(|source| CaStoreError::Io {
            path: key_path.clone(),
            source,
        })?;
        let keypair =
            KeyPair::load_key(key_pem, &self.passphrase).map_err(|source| CaStoreError::Key {
                path: key_path,
                source,
            })?;

        CryptoTokenAndChain::new(keypair, chain).map_err(|source| CaStoreError::Token {
            ca: name.to_string(),
            source,
        })
    }
}

impl CaStore for DirectoryCaStore {
    fn load_all(&self) -> Result<Vec<CryptoTokenAndChain>, CaStoreError> {
        let mut ca_dirs = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|source| CaStoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| CaStoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                ca_dirs.push(path);
            }
        }
        // Deterministic load order, so failures are reproducible.
        ca_dirs.sort();

        let mut tokens = Vec::with_capacity(ca_dirs.len());
        for dir in &ca_dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tokens.push(self.load_ca(dir, &name)?);
        }
        Ok(tokens)
    }
}

#[derive(Error, Debug)]
pub enum CaStoreError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode certificate chain at {path}: {source}")]
    ChainDecode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("could not load CA keypair at {path}: {source}")]
    Key {
        path: PathBuf,
        #[source]
        source: KeyLoadError,
    },
    #[error("CA {ca} has inconsistent signing material: {source}")]
    Token {
        ca: String,
        #[source]
        source: TokenChainError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pki::test_helpers::CaHierarchy;
    use pki::PemEncodable;

    const PASSPHRASE: &str = "Jf2mWqxzR8tCa5y";

    fn write_ca(root: &Path, name: &str, ca: &CaHierarchy) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(CHAIN_FILE), ca.chain().to_pem().unwrap()).unwrap();

        let mut key_file = fs::File::create(dir.join(KEY_FILE)).unwrap();
        ca.issuing_key
            .clone()
            .write_key(&mut key_file, PASSPHRASE)
            .unwrap();
    }

    #[test]
    fn loads_all_ca_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        let ca1 = CaHierarchy::issuing_under_root("ca1");
        let ca2 = CaHierarchy::issuing_under_root("ca2");
        write_ca(tmp.path(), "ca1", &ca1);
        write_ca(tmp.path(), "ca2", &ca2);

        let store = DirectoryCaStore::new(tmp.path(), PASSPHRASE);
        let tokens = store.load_all().unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn loaded_token_signs_with_stored_key() {
        let tmp = tempfile::tempdir().unwrap();
        let ca = CaHierarchy::issuing_under_root("ca1");
        write_ca(tmp.path(), "ca1", &ca);

        let store = DirectoryCaStore::new(tmp.path(), PASSPHRASE);
        let tokens = store.load_all().unwrap();
        assert_eq!(tokens[0].public_key(), ca.issuing_key.public_key());
    }

    #[test]
    fn wrong_passphrase_fails_load() {
        let tmp = tempfile::tempdir().unwrap();
        let ca = CaHierarchy::issuing_under_root("ca1");
        write_ca(tmp.path(), "ca1", &ca);

        let store = DirectoryCaStore::new(tmp.path(), "not the passphrase");
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, CaStoreError::Key { .. }));
    }

    #[test]
    fn missing_chain_file_fails_load() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("ca1")).unwrap();

        let store = DirectoryCaStore::new(tmp.path(), PASSPHRASE);
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, CaStoreError::Io { .. }));
    }

    #[test]
    fn non_directory_entries_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("README"), "not a CA").unwrap();

        let store = DirectoryCaStore::new(tmp.path(), PASSPHRASE);
        assert!(store.load_all().unwrap().is_empty());
    }
}
