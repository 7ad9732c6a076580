// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use rasn::{AsnType, Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asn::ToDerBytes;
use crate::common::{SerialId, Validity, ValidityError};
use crate::dn::SubjectDn;
use crate::error::EncodeError;
use crate::keypair::{KeyPair, PublicKey, Signature, SignatureVerificationError};
use crate::pem::PemTagged;

/// The signed body of a certificate. The signature covers the DER
/// encoding of this struct, so field order is part of the wire format.
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
pub struct CertificateData {
    pub serial: SerialId,
    pub subject: SubjectDn,
    pub subject_public_key: PublicKey,
    pub issuer: SubjectDn,
    pub issuer_public_key: PublicKey,
    pub validity: Validity,
    pub is_ca: bool,
}

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
pub struct Certificate {
    data: CertificateData,
    signature: Signature,
}

impl Certificate {
    /// Issues a self-signed CA root.
    pub fn self_signed_root(
        subject: SubjectDn,
        keypair: &KeyPair,
        validity: Validity,
    ) -> Result<Certificate, EncodeError> {
        let data = CertificateData {
            serial: SerialId::new_random(),
            subject: subject.clone(),
            subject_public_key: keypair.public_key(),
            issuer: subject,
            issuer_public_key: keypair.public_key(),
            validity,
            is_ca: true,
        };
        let signature = keypair.sign(&data.to_der()?);
        Ok(Certificate { data, signature })
    }

    /// Issues a certificate for `subject` signed by this certificate's key.
    /// `issuer_key` must be the keypair belonging to this certificate.
    pub fn issue(
        &self,
        issuer_key: &KeyPair,
        subject: SubjectDn,
        subject_public_key: PublicKey,
        validity: Validity,
        is_ca: bool,
    ) -> Result<Certificate, IssuanceError> {
        if !self.data.is_ca {
            return Err(IssuanceError::NotACertificateAuthority);
        }
        if issuer_key.public_key() != self.data.subject_public_key {
            return Err(IssuanceError::IssuerKeyMismatch);
        }
        let data = CertificateData {
            serial: SerialId::new_random(),
            subject,
            subject_public_key,
            issuer: self.data.subject.clone(),
            issuer_public_key: self.data.subject_public_key,
            validity,
            is_ca,
        };
        let signature = issuer_key.sign(&data.to_der()?);
        Ok(Certificate { data, signature })
    }

    /// Checks the certificate's signature against `issuer`, and that the
    /// certificate records that issuer key.
    pub fn verify_signed_by(&self, issuer: &PublicKey) -> Result<(), CertificateVerificationError> {
        if &self.data.issuer_public_key != issuer {
            return Err(CertificateVerificationError::IssuerKeyMismatch);
        }
        let bytes = self.data.to_der()?;
        issuer.verify(&bytes, &self.signature)?;
        Ok(())
    }

    pub fn is_self_signed(&self) -> bool {
        self.data.issuer_public_key == self.data.subject_public_key
            && self.verify_signed_by(&self.data.issuer_public_key).is_ok()
    }

    pub fn validate_validity(&self) -> Result<(), ValidityError> {
        self.data.validity.validate()
    }

    pub fn serial(&self) -> &SerialId {
        &self.data.serial
    }

    pub fn subject(&self) -> &SubjectDn {
        &self.data.subject
    }

    pub fn subject_public_key(&self) -> &PublicKey {
        &self.data.subject_public_key
    }

    pub fn issuer(&self) -> &SubjectDn {
        &self.data.issuer
    }

    pub fn issuer_public_key(&self) -> &PublicKey {
        &self.data.issuer_public_key
    }

    pub fn validity(&self) -> &Validity {
        &self.data.validity
    }

    pub fn is_ca(&self) -> bool {
        self.data.is_ca
    }
}

impl PemTagged for Certificate {
    const TAG: &'static str = "SECUREDNA CERTIFICATE";
}

#[derive(Error, Debug)]
pub enum IssuanceError {
    #[error("issuing certificate is not a certificate authority")]
    NotACertificateAuthority,
    #[error("supplied keypair does not belong to the issuing certificate")]
    IssuerKeyMismatch,
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Error, Debug)]
pub enum CertificateVerificationError {
    #[error("certificate does not name the given issuer key")]
    IssuerKeyMismatch,
    #[error(transparent)]
    Signature(#[from] SignatureVerificationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::DnComponentKind;
    use crate::pem::{PemDecodable, PemEncodable};

    fn root() -> (Certificate, KeyPair) {
        let kp = KeyPair::new_random();
        let subject = SubjectDn::new().with_component(DnComponentKind::CommonName, "root-ca");
        let cert =
            Certificate::self_signed_root(subject, &kp, Validity::valid_for_days(28).unwrap())
                .unwrap();
        (cert, kp)
    }

    #[test]
    fn self_signed_root_verifies_under_its_own_key() {
        let (cert, kp) = root();
        assert!(cert.is_self_signed());
        cert.verify_signed_by(&kp.public_key()).unwrap();
    }

    #[test]
    fn issued_certificate_records_issuer_identity() {
        let (root_cert, root_kp) = root();
        let leaf_kp = KeyPair::new_random();
        let subject = SubjectDn::new().with_component(DnComponentKind::CommonName, "ocsp-signer");

        let leaf = root_cert
            .issue(
                &root_kp,
                subject,
                leaf_kp.public_key(),
                Validity::valid_for_days(7).unwrap(),
                false,
            )
            .unwrap();

        assert_eq!(leaf.issuer(), root_cert.subject());
        assert_eq!(leaf.issuer_public_key(), &root_kp.public_key());
        leaf.verify_signed_by(&root_kp.public_key()).unwrap();
    }

    #[test]
    fn cannot_issue_with_mismatched_keypair() {
        let (root_cert, _) = root();
        let wrong_kp = KeyPair::new_random();
        let result = root_cert.issue(
            &wrong_kp,
            SubjectDn::new(),
            wrong_kp.public_key(),
            Validity::valid_for_days(7).unwrap(),
            false,
        );
        assert!(matches!(result, Err(IssuanceError::IssuerKeyMismatch)));
    }

    #[test]
    fn non_ca_certificate_cannot_issue() {
        let (root_cert, root_kp) = root();
        let leaf_kp = KeyPair::new_random();
        let leaf = root_cert
            .issue(
                &root_kp,
                SubjectDn::new().with_component(DnComponentKind::CommonName, "leaf"),
                leaf_kp.public_key(),
                Validity::valid_for_days(7).unwrap(),
                false,
            )
            .unwrap();

        let result = leaf.issue(
            &leaf_kp,
            SubjectDn::new(),
            KeyPair::new_random().public_key(),
            Validity::valid_for_days(7).unwrap(),
            false,
        );
        assert!(matches!(
            result,
            Err(IssuanceError::NotACertificateAuthority)
        ));
    }

    #[test]
    fn certificate_pem_round_trips() {
        let (cert, _) = root();
        let encoded = cert.to_pem().unwrap();
        assert!(encoded.contains("SECUREDNA CERTIFICATE"));

        let decoded = Certificate::from_pem(encoded).unwrap();
        assert_eq!(cert, decoded);
    }

    #[test]
    fn verification_fails_under_unrelated_key() {
        let (cert, _) = root();
        let unrelated = KeyPair::new_random();
        cert.verify_signed_by(&unrelated.public_key())
            .expect_err("unrelated key should not verify");
    }
}
