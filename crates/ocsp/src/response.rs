// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use rasn::{AsnType, Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pki::{
    CertificateChain, ChainValidationError, EncodeError, PemTagged, PublicKey, SerialId,
    Signed, SignatureVerificationError, ToDerBytes,
};

#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[rasn(automatic_tags)]
pub struct Good;

#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[rasn(automatic_tags)]
pub struct RevokedInfo {
    pub revoked_at: i64,
}

#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[rasn(automatic_tags)]
pub struct Unknown;

/// The revocation status carried by a response.
#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[rasn(automatic_tags)]
#[rasn(choice)]
pub enum CertStatus {
    Good(Good),
    Revoked(RevokedInfo),
    Unknown(Unknown),
}

impl CertStatus {
    pub fn good() -> Self {
        CertStatus::Good(Good)
    }

    pub fn revoked(revoked_at: i64) -> Self {
        CertStatus::Revoked(RevokedInfo { revoked_at })
    }

    pub fn unknown() -> Self {
        CertStatus::Unknown(Unknown)
    }
}

/// The signed body of a status response. The signature covers the DER
/// encoding of this struct.
#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[rasn(automatic_tags)]
pub struct ResponseData {
    pub serial: SerialId,
    pub produced_at: i64,
    pub status: CertStatus,
    pub responder_key: PublicKey,
}

/// A signed status response plus the responder's certificate chain, so
/// clients can validate the responder up to a trusted root.
#[derive(AsnType, Decode, Encode, Debug, Clone, PartialEq, Eq)]
#[rasn(automatic_tags)]
pub struct StatusResponse {
    signed: Signed<ResponseData>,
    chain: CertificateChain,
}

impl StatusResponse {
    pub fn new(signed: Signed<ResponseData>, chain: CertificateChain) -> Self {
        Self { signed, chain }
    }

    pub fn data(&self) -> &ResponseData {
        self.signed.data()
    }

    pub fn status(&self) -> &CertStatus {
        &self.signed.data().status
    }

    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// Validates the responder chain, that the chain's leaf holds the key
    /// named in the response, and the signature itself.
    pub fn verify(&self) -> Result<(), ResponseVerificationError> {
        self.chain.verify()?;
        let leaf = self
            .chain
            .leaf()
            .ok_or(ResponseVerificationError::Chain(ChainValidationError::Empty))?;
        if leaf.subject_public_key() != &self.signed.data().responder_key {
            return Err(ResponseVerificationError::ResponderKeyMismatch);
        }
        let bytes = self.signed.data().to_der()?;
        leaf.subject_public_key()
            .verify(&bytes, self.signed.signature())?;
        Ok(())
    }
}

impl PemTagged for StatusResponse {
    const TAG: &'static str = "SECUREDNA OCSP RESPONSE";
}

#[derive(Error, Debug)]
pub enum ResponseVerificationError {
    #[error(transparent)]
    Chain(#[from] ChainValidationError),
    #[error("responder chain leaf does not hold the response's signing key")]
    ResponderKeyMismatch,
    #[error(transparent)]
    Signature(#[from] SignatureVerificationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
