// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// One named, numbered match value within a token type. Stored
/// authorization rules reference the numeric code by value, so the code
/// of a released value never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessMatchValue {
    token_type: String,
    name: String,
    numeric_value: u32,
    is_default: bool,
    issued_by_ca: bool,
}

impl AccessMatchValue {
    pub(crate) fn new(
        token_type: impl Into<String>,
        name: impl Into<String>,
        numeric_value: u32,
        is_default: bool,
        issued_by_ca: bool,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            name: name.into(),
            numeric_value,
            is_default,
            issued_by_ca,
        }
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn numeric_value(&self) -> u32 {
        self.numeric_value
    }

    /// Whether rules that name no explicit match value fall back to this
    /// one. Exactly one value per token type carries this flag.
    pub fn is_default_value(&self) -> bool {
        self.is_default
    }

    pub fn is_issued_by_ca(&self) -> bool {
        self.issued_by_ca
    }
}
