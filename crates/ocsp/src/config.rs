// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Responder deployment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponderConfig {
    /// Directory with one subdirectory per CA (chain plus encrypted key).
    pub ca_store_dir: PathBuf,
    /// File containing the passphrase for the CA keypair files.
    pub ca_key_passphrase_file: PathBuf,
}

impl ResponderConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not parse responder config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_from_toml() {
        let config = ResponderConfig::from_toml_str(
            r#"
            ca_store_dir = "/var/lib/responder/cas"
            ca_key_passphrase_file = "/run/secrets/ca-passphrase"
        "#,
        )
        .unwrap();
        assert_eq!(config.ca_store_dir, PathBuf::from("/var/lib/responder/cas"));
    }

    #[test]
    fn missing_field_fails_parse() {
        let err = ResponderConfig::from_toml_str("ca_store_dir = \"/tmp\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
