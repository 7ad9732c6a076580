// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use pki::CertificateRequest;
use thiserror::Error;

use crate::profile::CertificateProfileName;

/// A pluggable transformation applied to a certificate request before
/// issuance. Implementations receive the output of the previous handler
/// and must return a structurally valid request or fail.
///
/// Handlers may read external systems or log, but any request mutation
/// goes through the returned value; side effects on shared state are the
/// handler's own responsibility.
pub trait RequestHandler: Send + Sync {
    /// Short human-readable name, used in logs and rejection reports.
    fn readable_name(&self) -> &str;

    fn process(
        &self,
        request: CertificateRequest,
        profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected>;
}

/// Raised by a handler to abort the chain. The request is not issuable
/// as-is; the caller reports issuance failure and does not retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request rejected by handler {handler}: {reason}")]
pub struct RequestRejected {
    pub handler: String,
    pub reason: String,
}

impl RequestRejected {
    pub fn new(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            reason: reason.into(),
        }
    }
}

/// Adapts a closure into a named handler, for deployments that register
/// transformations without defining a type.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(CertificateRequest, &CertificateProfileName) -> Result<CertificateRequest, RequestRejected>
        + Send
        + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(CertificateRequest, &CertificateProfileName) -> Result<CertificateRequest, RequestRejected>
        + Send
        + Sync,
{
    fn readable_name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        request: CertificateRequest,
        profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected> {
        (self.f)(request, profile)
    }
}
