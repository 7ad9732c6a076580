// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in request handlers. Deployment-specific handlers are supplied
//! as plugins through the registry; these cover the transformations every
//! deployment ends up needing.

use pki::{CertificateRequest, DnComponentKind};
use serde::Deserialize;

use crate::handler::{RequestHandler, RequestRejected};
use crate::profile::CertificateProfileName;

/// Sets a subject DN component to a fixed value, optionally only when the
/// requester left it empty.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDnComponent {
    pub component: DnComponentKind,
    pub value: String,
    #[serde(default)]
    pub only_if_absent: bool,
}

impl RequestHandler for SetDnComponent {
    fn readable_name(&self) -> &str {
        "set-dn-component"
    }

    fn process(
        &self,
        mut request: CertificateRequest,
        _profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected> {
        if self.only_if_absent && request.subject().get(self.component).is_some() {
            return Ok(request);
        }
        request.subject_mut().set(self.component, self.value.clone());
        Ok(request)
    }
}

/// Rejects requests whose subject DN is missing a component.
#[derive(Debug, Clone, Deserialize)]
pub struct RequireDnComponent {
    pub component: DnComponentKind,
}

impl RequestHandler for RequireDnComponent {
    fn readable_name(&self) -> &str {
        "require-dn-component"
    }

    fn process(
        &self,
        request: CertificateRequest,
        _profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected> {
        match request.subject().get(self.component) {
            Some(value) if !value.is_empty() => Ok(request),
            _ => Err(RequestRejected::new(
                self.readable_name(),
                format!("subject DN is missing required component {}", self.component),
            )),
        }
    }
}

/// Rejects requests carrying extensions outside the configured allow list.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionAllowList {
    pub allow: Vec<String>,
}

impl RequestHandler for ExtensionAllowList {
    fn readable_name(&self) -> &str {
        "extension-allow-list"
    }

    fn process(
        &self,
        request: CertificateRequest,
        _profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected> {
        for extension in request.extensions() {
            if !self.allow.iter().any(|name| name == &extension.name) {
                return Err(RequestRejected::new(
                    self.readable_name(),
                    format!("extension {} is not permitted", extension.name),
                ));
            }
        }
        Ok(request)
    }
}
