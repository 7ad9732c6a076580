// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use rasn::{AsnType, Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::certificate::Certificate;
use crate::common::ValidityError;
use crate::pem::PemTagged;

/// An ordered certificate chain, leaf first, root last. The order is part
/// of the contract; consumers index the leaf as the signing identity.
#[derive(
    AsnType, Decode, Encode, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[rasn(automatic_tags)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    pub fn from_leaf_to_root(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    pub fn leaf(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    pub fn root(&self) -> Option<&Certificate> {
        self.certificates.last()
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    /// Checks that every certificate is signed by its successor, that the
    /// final certificate is self-signed, and that every link is within
    /// its validity window.
    pub fn verify(&self) -> Result<(), ChainValidationError> {
        if self.certificates.is_empty() {
            return Err(ChainValidationError::Empty);
        }
        for (index, cert) in self.certificates.iter().enumerate() {
            cert.validate_validity()
                .map_err(|source| ChainValidationError::OutsideValidityPeriod { index, source })?;
        }
        for (index, pair) in self.certificates.windows(2).enumerate() {
            let (child, parent) = (&pair[0], &pair[1]);
            if child.verify_signed_by(parent.subject_public_key()).is_err() {
                return Err(ChainValidationError::BrokenLink { index });
            }
        }
        let root = &self.certificates[self.certificates.len() - 1];
        if !root.is_self_signed() {
            return Err(ChainValidationError::RootNotSelfSigned);
        }
        Ok(())
    }
}

impl PemTagged for CertificateChain {
    const TAG: &'static str = "SECUREDNA CERTIFICATE CHAIN";
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

#[derive(Error, Debug)]
pub enum ChainValidationError {
    #[error("certificate chain is empty")]
    Empty,
    #[error("certificate at position {index} is not signed by its successor")]
    BrokenLink { index: usize },
    #[error("final chain certificate is not self-signed")]
    RootNotSelfSigned,
    #[error("certificate at position {index} is outside its validity period: {source}")]
    OutsideValidityPeriod { index: usize, source: ValidityError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CaHierarchy;

    #[test]
    fn valid_chain_verifies() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        ca.chain().verify().unwrap();
    }

    #[test]
    fn empty_chain_is_rejected() {
        let chain = CertificateChain::default();
        assert!(matches!(chain.verify(), Err(ChainValidationError::Empty)));
    }

    #[test]
    fn chain_with_unrelated_parent_is_rejected() {
        let ca1 = CaHierarchy::issuing_under_root("ca1");
        let ca2 = CaHierarchy::issuing_under_root("ca2");

        let chain = CertificateChain::from_leaf_to_root(vec![
            ca1.issuing_cert.clone(),
            ca2.root_cert.clone(),
        ]);
        assert!(matches!(
            chain.verify(),
            Err(ChainValidationError::BrokenLink { index: 0 })
        ));
    }

    #[test]
    fn chain_missing_self_signed_root_is_rejected() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let chain = CertificateChain::from_leaf_to_root(vec![ca.issuing_cert.clone()]);
        assert!(matches!(
            chain.verify(),
            Err(ChainValidationError::RootNotSelfSigned)
        ));
    }

    #[test]
    fn leaf_and_root_follow_declared_order() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let chain = ca.chain();
        assert_eq!(chain.leaf(), Some(&ca.issuing_cert));
        assert_eq!(chain.root(), Some(&ca.root_cert));
    }
}
