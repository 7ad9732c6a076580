// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

mod asn;
mod certificate;
mod chain;
mod common;
mod dn;
mod error;
mod keypair;
mod pem;
mod request;

pub use crate::asn::{FromDerBytes, ToDerBytes};
pub use crate::certificate::{
    Certificate, CertificateData, CertificateVerificationError, IssuanceError,
};
pub use crate::chain::{CertificateChain, ChainValidationError};
pub use crate::common::{SerialId, SerialIdParseError, Signed, Validity, ValidityError};
pub use crate::dn::{DnComponent, DnComponentKind, DnComponentKindParseError, SubjectDn};
pub use crate::error::{DecodeError, EncodeError};
pub use crate::keypair::{
    KeyLoadError, KeyPair, KeyWriteError, PublicKey, Signature, SignatureVerificationError,
};
pub use crate::pem::{PemDecodable, PemEncodable, PemTagged};
pub use crate::request::{
    CertificateRequest, Extension, RequestMetadata, RequestPayload, RequestVerificationError,
};

pub mod test_helpers;
