// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use pki::CertificateRequest;
use tracing::{debug, warn};

use crate::handler::{RequestHandler, RequestRejected};
use crate::profile::CertificateProfileName;

/// An ordered sequence of request handlers, applied to each inbound
/// request before issuance. Order is fixed at construction; there is no
/// priority inference or reordering.
///
/// Safe to share across concurrent callers: processing never mutates the
/// chain, and each invocation works on its own copy of the request.
#[derive(Default, Clone)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn push(&mut self, handler: Arc<dyn RequestHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the request through every handler in order. The input request
    /// must already have its proof-of-possession signature checked.
    ///
    /// Failure is atomic: on the first rejection the caller's request is
    /// returned untouched in the sense that `request` itself is never
    /// mutated, and no partially transformed value escapes.
    pub fn process(
        &self,
        request: &CertificateRequest,
        profile: &CertificateProfileName,
    ) -> Result<CertificateRequest, RequestRejected> {
        let mut current = request.clone();
        for handler in &self.handlers {
            debug!(
                handler = handler.readable_name(),
                request = %current.request_id(),
                profile = %profile,
                "applying request handler"
            );
            current = handler.process(current, profile).map_err(|rejection| {
                warn!(
                    handler = %rejection.handler,
                    request = %request.request_id(),
                    reason = %rejection.reason,
                    "request rejected by handler chain"
                );
                rejection
            })?;
        }
        Ok(current)
    }
}
