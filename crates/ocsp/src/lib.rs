// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

mod cache;
mod config;
mod responder;
mod response;
mod revocation;
mod store;
mod token_chain;

pub use cache::{CacheReloadError, CacheSnapshot, TokenChainCache};
pub use config::{ConfigError, ResponderConfig};
pub use responder::{OcspResponder, ResponseError, StatusQuery};
pub use response::{
    CertStatus, ResponseData, ResponseVerificationError, RevokedInfo, StatusResponse,
};
pub use revocation::{RevocationList, RevocationRecord};
pub use store::{CaStore, CaStoreError, DirectoryCaStore};
pub use token_chain::{CryptoTokenAndChain, IssuerId, IssuerIdParseError, SigningError, TokenChainError};
