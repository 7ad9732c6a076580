// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::match_value::AccessMatchValue;

/// One match value as declared by a token-type family, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchValueDef {
    pub name: String,
    pub numeric_value: u32,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub issued_by_ca: bool,
}

/// A token-type family and its match values. Families are contributed at
/// deployment time (built-in or from config) and frozen by `build()`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenTypeDef {
    pub token_type: String,
    #[serde(rename = "value")]
    pub values: Vec<MatchValueDef>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    defs: Vec<TokenTypeDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_type(mut self, def: TokenTypeDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Validates all families and freezes the registry. Within each token
    /// type, numeric codes and names must be unique and exactly one value
    /// must be the default.
    pub fn build(self) -> Result<MatchValueRegistry, RegistryError> {
        let mut by_type: HashMap<String, Vec<AccessMatchValue>> = HashMap::new();
        for def in self.defs {
            if by_type.contains_key(&def.token_type) {
                return Err(RegistryError::DuplicateTokenType {
                    token_type: def.token_type,
                });
            }

            let mut values = Vec::with_capacity(def.values.len());
            let mut default_count = 0;
            for value in &def.values {
                if values
                    .iter()
                    .any(|v: &AccessMatchValue| v.numeric_value() == value.numeric_value)
                {
                    return Err(RegistryError::DuplicateNumericValue {
                        token_type: def.token_type.clone(),
                        numeric_value: value.numeric_value,
                    });
                }
                if values.iter().any(|v: &AccessMatchValue| v.name() == value.name) {
                    return Err(RegistryError::DuplicateName {
                        token_type: def.token_type.clone(),
                        name: value.name.clone(),
                    });
                }
                if value.is_default {
                    default_count += 1;
                }
                values.push(AccessMatchValue::new(
                    &def.token_type,
                    &value.name,
                    value.numeric_value,
                    value.is_default,
                    value.issued_by_ca,
                ));
            }

            match default_count {
                0 => {
                    return Err(RegistryError::NoDefaultValue {
                        token_type: def.token_type,
                    })
                }
                1 => {}
                _ => {
                    return Err(RegistryError::MultipleDefaultValues {
                        token_type: def.token_type,
                    })
                }
            }

            by_type.insert(def.token_type, values);
        }
        Ok(MatchValueRegistry { by_type })
    }
}

/// The deployment's frozen set of match values, per token type. No
/// mutation after `build()`; rule evaluation only reads.
#[derive(Debug)]
pub struct MatchValueRegistry {
    by_type: HashMap<String, Vec<AccessMatchValue>>,
}

impl MatchValueRegistry {
    /// All match values of a token type, in declaration order.
    pub fn values_for(&self, token_type: &str) -> Option<&[AccessMatchValue]> {
        self.by_type.get(token_type).map(|v| v.as_slice())
    }

    /// The fallback value used when a rule names no explicit match value.
    pub fn default_for(&self, token_type: &str) -> Option<&AccessMatchValue> {
        self.by_type
            .get(token_type)?
            .iter()
            .find(|v| v.is_default_value())
    }

    pub fn by_numeric_value(
        &self,
        token_type: &str,
        numeric_value: u32,
    ) -> Option<&AccessMatchValue> {
        self.by_type
            .get(token_type)?
            .iter()
            .find(|v| v.numeric_value() == numeric_value)
    }

    pub fn token_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(|k| k.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("token type {token_type} registered more than once")]
    DuplicateTokenType { token_type: String },
    #[error("token type {token_type} declares numeric value {numeric_value} more than once")]
    DuplicateNumericValue {
        token_type: String,
        numeric_value: u32,
    },
    #[error("token type {token_type} declares value name {name} more than once")]
    DuplicateName { token_type: String, name: String },
    #[error("token type {token_type} declares no default match value")]
    NoDefaultValue { token_type: String },
    #[error("token type {token_type} declares more than one default match value")]
    MultipleDefaultValues { token_type: String },
}
