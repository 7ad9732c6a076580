// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::registry::{MatchValueDef, TokenTypeDef};

/// Token type of command-line authentication tokens.
pub const CLI_TOKEN_TYPE: &str = "CliAuthenticationToken";

pub const CLI_USERNAME_NAME: &str = "USERNAME";

/// Released code; stored authorization rules reference it by value.
pub const CLI_USERNAME_CODE: u32 = 0;

/// The built-in command-line token family: rules match on the invoking
/// username, and do so by default. CLI tokens are minted locally, not
/// issued by a CA.
pub fn cli_token_type() -> TokenTypeDef {
    TokenTypeDef {
        token_type: CLI_TOKEN_TYPE.to_string(),
        values: vec![MatchValueDef {
            name: CLI_USERNAME_NAME.to_string(),
            numeric_value: CLI_USERNAME_CODE,
            is_default: true,
            issued_by_ca: false,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    #[test]
    fn cli_username_code_is_frozen() {
        // Persisted rules depend on this exact code.
        assert_eq!(CLI_USERNAME_CODE, 0);
    }

    #[test]
    fn cli_token_type_registers_cleanly() {
        let registry = RegistryBuilder::new()
            .with_token_type(cli_token_type())
            .build()
            .unwrap();

        let values = registry.values_for(CLI_TOKEN_TYPE).unwrap();
        assert_eq!(values.len(), 1);

        let username = &values[0];
        assert_eq!(username.name(), CLI_USERNAME_NAME);
        assert_eq!(username.numeric_value(), CLI_USERNAME_CODE);
        assert!(username.is_default_value());
        assert!(!username.is_issued_by_ca());
    }

    #[test]
    fn default_for_cli_token_is_username() {
        let registry = RegistryBuilder::new()
            .with_token_type(cli_token_type())
            .build()
            .unwrap();
        assert_eq!(
            registry.default_for(CLI_TOKEN_TYPE).map(|v| v.name()),
            Some(CLI_USERNAME_NAME)
        );
    }
}
