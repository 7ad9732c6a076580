// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use pki::SerialId;

use crate::cache::{CacheReloadError, TokenChainCache};
use crate::response::{CertStatus, ResponseData, StatusResponse};
use crate::revocation::RevocationList;
use crate::token_chain::{CryptoTokenAndChain, IssuerId, SigningError};

/// A certificate-status query: which issuer, which serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusQuery {
    pub issuer: IssuerId,
    pub serial: SerialId,
}

/// Produces signed status responses from cached CA signing material.
///
/// Safe for concurrent use; each generation works against the snapshot
/// current at lookup time. Cache misses never trigger a reload, since
/// unknown-issuer traffic could otherwise force repeated expensive
/// reloads. Reloading is an explicit administrative operation.
pub struct OcspResponder {
    cache: Arc<TokenChainCache>,
    revocations: RevocationList,
}

impl OcspResponder {
    pub fn new(cache: Arc<TokenChainCache>, revocations: RevocationList) -> Self {
        Self { cache, revocations }
    }

    /// Selects the signing material for the query's issuer and returns a
    /// signed status response.
    pub fn generate(&self, query: &StatusQuery) -> Result<StatusResponse, ResponseError> {
        let token = self.cache.lookup(&query.issuer).ok_or_else(|| {
            debug!(issuer = %query.issuer, "status query for unknown issuer");
            ResponseError::UnknownIssuer {
                issuer: query.issuer,
            }
        })?;

        let status = self.status_of(query);
        let data = ResponseData {
            serial: query.serial,
            produced_at: OffsetDateTime::now_utc().unix_timestamp(),
            status,
            responder_key: token.public_key(),
        };
        let signed = token.sign_der(data).map_err(|source| {
            // Possibly transient (hardware token unavailable); the cache
            // entry stays so a recovered token resumes serving.
            warn!(issuer = %query.issuer, error = %source, "could not sign status response");
            ResponseError::Signing(source)
        })?;
        Ok(StatusResponse::new(signed, token.chain().clone()))
    }

    fn status_of(&self, query: &StatusQuery) -> CertStatus {
        if !self.revocations.covers(&query.issuer) {
            return CertStatus::unknown();
        }
        match self.revocations.revoked_at(&query.issuer, &query.serial) {
            Some(revoked_at) => CertStatus::revoked(revoked_at),
            None => CertStatus::good(),
        }
    }

    /// Administrative: synchronously rebuilds the signing-material cache.
    /// Responses already being generated keep their snapshot.
    pub fn reload_token_and_chain_cache(&self) -> Result<usize, CacheReloadError> {
        self.cache.reload()
    }

    /// Point-in-time view of the cached signing material.
    pub fn cache_values(&self) -> Vec<Arc<CryptoTokenAndChain>> {
        self.cache.cache_values()
    }
}

#[derive(Error, Debug)]
pub enum ResponseError {
    /// Client-facing miss, not an internal fault.
    #[error("no cached signing material for issuer {issuer}")]
    UnknownIssuer { issuer: IssuerId },
    #[error(transparent)]
    Signing(#[from] SigningError),
}
