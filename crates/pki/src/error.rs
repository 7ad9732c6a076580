// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use pem::PemError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EncodeError {
    #[error("could not DER encode: {0}")]
    DerEncode(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    PemError(#[from] PemError),
    #[error("could not DER decode: {0}")]
    DerDecode(String),
    #[error("unexpected PEM tag, expected {0}, got {1}")]
    UnexpectedPemTag(String, String),
    #[error("unable to parse decoded bytes into required type")]
    ParseError,
}
