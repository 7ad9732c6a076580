// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

mod chain;
mod config;
mod handler;
mod handlers;
mod profile;

pub use chain::HandlerChain;
pub use config::{ChainConfig, ChainConfigError, HandlerEntry, HandlerRegistry};
pub use handler::{FnHandler, RequestHandler, RequestRejected};
pub use handlers::{ExtensionAllowList, RequireDnComponent, SetDnComponent};
pub use profile::CertificateProfileName;
