// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization match values: the closed, numbered vocabulary that
//! stored authorization rules use to describe which attribute of an
//! authentication token they match on. Numeric codes are persisted in
//! rule storage, so a released code is frozen forever.

mod cli;
mod match_value;
mod registry;

pub use cli::{cli_token_type, CLI_TOKEN_TYPE, CLI_USERNAME_CODE, CLI_USERNAME_NAME};
pub use match_value::AccessMatchValue;
pub use registry::{MatchValueDef, MatchValueRegistry, RegistryBuilder, RegistryError, TokenTypeDef};
