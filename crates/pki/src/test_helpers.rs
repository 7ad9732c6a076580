// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for constructing CA hierarchies and requests in tests. Not for
//! production use: validity windows are short and subjects are synthetic.

use crate::certificate::Certificate;
use crate::chain::CertificateChain;
use crate::common::Validity;
use crate::dn::{DnComponentKind, SubjectDn};
use crate::keypair::KeyPair;
use crate::request::{CertificateRequest, Extension};

/// A root CA with one issuing (intermediate) CA beneath it.
pub struct CaHierarchy {
    pub root_cert: Certificate,
    pub root_key: KeyPair,
    pub issuing_cert: Certificate,
    pub issuing_key: KeyPair,
}

impl CaHierarchy {
    pub fn issuing_under_root(name: &str) -> Self {
        let root_key = KeyPair::new_random();
        let root_subject = SubjectDn::new()
            .with_component(DnComponentKind::CommonName, format!("{name}-root"))
            .with_component(DnComponentKind::Organization, "SecureDNA");
        let root_cert = Certificate::self_signed_root(
            root_subject,
            &root_key,
            Validity::valid_for_days(28).unwrap(),
        )
        .unwrap();

        let issuing_key = KeyPair::new_random();
        let issuing_subject = SubjectDn::new()
            .with_component(DnComponentKind::CommonName, format!("{name}-issuing"))
            .with_component(DnComponentKind::Organization, "SecureDNA");
        let issuing_cert = root_cert
            .issue(
                &root_key,
                issuing_subject,
                issuing_key.public_key(),
                Validity::valid_for_days(14).unwrap(),
                true,
            )
            .unwrap();

        Self {
            root_cert,
            root_key,
            issuing_cert,
            issuing_key,
        }
    }

    /// Leaf-to-root chain for the issuing CA.
    pub fn chain(&self) -> CertificateChain {
        CertificateChain::from_leaf_to_root(vec![self.issuing_cert.clone(), self.root_cert.clone()])
    }
}

/// A verified end-entity request with the given common name.
pub fn end_entity_request(common_name: &str) -> CertificateRequest {
    let kp = KeyPair::new_random();
    let subject = SubjectDn::new().with_component(DnComponentKind::CommonName, common_name);
    CertificateRequest::new(subject, vec![], &kp).unwrap()
}

/// As `end_entity_request`, but carrying the given requested extensions.
pub fn end_entity_request_with_extensions(
    common_name: &str,
    extensions: Vec<Extension>,
) -> CertificateRequest {
    let kp = KeyPair::new_random();
    let subject = SubjectDn::new().with_component(DnComponentKind::CommonName, common_name);
    CertificateRequest::new(subject, extensions, &kp).unwrap()
}
