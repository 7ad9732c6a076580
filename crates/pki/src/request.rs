// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Certificate requests as processed by the issuance pipeline: a signed,
//! immutable payload produced by the subject, plus mutable issuance
//! metadata that request handlers may enrich or replace. Only the payload
//! is part of the wire format.

use rasn::types::Constraints;
use rasn::{AsnType, Decode, Decoder, Encode, Encoder, Tag};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asn::ToDerBytes;
use crate::common::{SerialId, Signed};
use crate::dn::SubjectDn;
use crate::error::EncodeError;
use crate::keypair::{KeyPair, PublicKey, SignatureVerificationError};
use crate::pem::PemTagged;

/// A requested certificate extension. Carried opaquely through the
/// pipeline; the issuance engine decides what each name means.
#[derive(
    AsnType,
    Decode,
    Encode,
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[rasn(automatic_tags)]
pub struct Extension {
    pub name: String,
    pub value: String,
    pub critical: bool,
}

impl Extension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            critical: false,
        }
    }
}

/// What the subject asked for and signed. Never modified after signing.
#[derive(
    AsnType,
    Decode,
    Encode,
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[rasn(automatic_tags)]
pub struct RequestPayload {
    pub request_id: SerialId,
    pub subject: SubjectDn,
    pub public_key: PublicKey,
    pub extensions: Vec<Extension>,
}

/// Issuance metadata derived from the payload. Request handlers mutate
/// this; the signed payload stays untouched and remains available for
/// auditing what the subject originally asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    pub subject: SubjectDn,
    pub extensions: Vec<Extension>,
}

impl RequestMetadata {
    fn from_payload(payload: &RequestPayload) -> Self {
        Self {
            subject: payload.subject.clone(),
            extensions: payload.extensions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    payload: Signed<RequestPayload>,
    metadata: RequestMetadata,
}

impl CertificateRequest {
    /// Creates a request for `subject`, signed by the subject's keypair as
    /// proof of possession.
    pub fn new(
        subject: SubjectDn,
        extensions: Vec<Extension>,
        keypair: &KeyPair,
    ) -> Result<Self, EncodeError> {
        let payload = RequestPayload {
            request_id: SerialId::new_random(),
            subject,
            public_key: keypair.public_key(),
            extensions,
        };
        let payload = keypair.sign_der(payload)?;
        let metadata = RequestMetadata::from_payload(payload.data());
        Ok(Self { payload, metadata })
    }

    /// Checks the proof-of-possession signature against the key named in
    /// the payload. Required before the request enters the handler chain.
    pub fn verify(&self) -> Result<(), RequestVerificationError> {
        let bytes = self.payload.data().to_der()?;
        self.payload
            .data()
            .public_key
            .verify(&bytes, self.payload.signature())?;
        Ok(())
    }

    pub fn request_id(&self) -> &SerialId {
        &self.payload.data().request_id
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.payload.data().public_key
    }

    /// The subject DN as originally signed by the requester.
    pub fn requested_subject(&self) -> &SubjectDn {
        &self.payload.data().subject
    }

    /// The effective subject DN, as enriched by the handler chain.
    pub fn subject(&self) -> &SubjectDn {
        &self.metadata.subject
    }

    pub fn subject_mut(&mut self) -> &mut SubjectDn {
        &mut self.metadata.subject
    }

    /// The effective extension set, as enriched by the handler chain.
    pub fn extensions(&self) -> &[Extension] {
        &self.metadata.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Vec<Extension> {
        &mut self.metadata.extensions
    }
}

impl PemTagged for CertificateRequest {
    const TAG: &'static str = "SECUREDNA CERTIFICATE REQUEST";
}

impl AsnType for CertificateRequest {
    const TAG: Tag = Tag::SEQUENCE;
}

// Only the signed payload is encoded; metadata is processing state and is
// rebuilt from the payload on decode.
impl Encode for CertificateRequest {
    fn encode_with_tag_and_constraints<E: Encoder>(
        &self,
        encoder: &mut E,
        tag: Tag,
        constraints: Constraints,
    ) -> Result<(), E::Error> {
        self.payload
            .encode_with_tag_and_constraints(encoder, tag, constraints)
    }
}

impl Decode for CertificateRequest {
    fn decode_with_tag_and_constraints<D: Decoder>(
        decoder: &mut D,
        tag: Tag,
        constraints: Constraints,
    ) -> Result<Self, D::Error> {
        let payload =
            Signed::<RequestPayload>::decode_with_tag_and_constraints(decoder, tag, constraints)?;
        let metadata = RequestMetadata::from_payload(payload.data());
        Ok(Self { payload, metadata })
    }
}

#[derive(Error, Debug)]
pub enum RequestVerificationError {
    #[error(transparent)]
    Signature(#[from] SignatureVerificationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
