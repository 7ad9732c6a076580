// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use pki::{
    der_octet_string_newtype, CertificateChain, ChainValidationError, EncodeError, KeyPair,
    PublicKey, Signed, ToDerBytes,
};

/// Identifies the CA a response is answered for: the raw bytes of the
/// CA's signing public key.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct IssuerId([u8; Self::LEN]);

impl IssuerId {
    const LEN: usize = PublicKey::LEN;
}

der_octet_string_newtype!(IssuerId, IssuerId::LEN);

impl From<PublicKey> for IssuerId {
    fn from(key: PublicKey) -> Self {
        Self(key.to_bytes())
    }
}

impl Display for IssuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for IssuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IssuerId").field(&self.to_string()).finish()
    }
}

#[derive(Error, Debug)]
#[error("could not parse issuer id from hex value")]
pub struct IssuerIdParseError;

impl FromStr for IssuerId {
    type Err = IssuerIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; Self::LEN] = hex::decode(s)
            .map_err(|_| IssuerIdParseError)?
            .try_into()
            .map_err(|_| IssuerIdParseError)?;
        Ok(Self(bytes))
    }
}

/// A CA's signing key handle paired with its leaf-to-root certificate
/// chain. Created on cache load, published behind an `Arc`, and read-only
/// afterwards; all concurrent responders for the CA share one instance.
pub struct CryptoTokenAndChain {
    signer: KeyPair,
    chain: CertificateChain,
    issuer_id: IssuerId,
}

impl CryptoTokenAndChain {
    /// Pairs a signing key with its chain. The chain must verify and its
    /// leaf must belong to `signer`.
    pub fn new(signer: KeyPair, chain: CertificateChain) -> Result<Self, TokenChainError> {
        chain.verify()?;
        let leaf_key_matches = chain
            .leaf()
            .is_some_and(|leaf| leaf.subject_public_key() == &signer.public_key());
        if !leaf_key_matches {
            return Err(TokenChainError::KeyMismatch);
        }
        let issuer_id = IssuerId::from(signer.public_key());
        Ok(Self {
            signer,
            chain,
            issuer_id,
        })
    }

    pub fn issuer_id(&self) -> IssuerId {
        self.issuer_id
    }

    pub fn public_key(&self) -> PublicKey {
        self.signer.public_key()
    }

    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// Signs the DER encoding of `data` with the CA key.
    pub fn sign_der<T: ToDerBytes>(&self, data: T) -> Result<Signed<T>, SigningError> {
        self.signer
            .sign_der(data)
            .map_err(|source| SigningError {
                issuer: self.issuer_id,
                source,
            })
    }
}

impl Debug for CryptoTokenAndChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoTokenAndChain")
            .field("issuer_id", &self.issuer_id)
            .field("chain_length", &self.chain.len())
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum TokenChainError {
    #[error(transparent)]
    Chain(#[from] ChainValidationError),
    #[error("signing key does not match the chain's leaf certificate")]
    KeyMismatch,
}

/// The key handle could not produce a signature. May be transient (for
/// hardware-backed handles); the cache entry is not evicted on this error.
#[derive(Error, Debug)]
#[error("signing key for issuer {issuer} is unusable: {source}")]
pub struct SigningError {
    pub issuer: IssuerId,
    #[source]
    pub source: EncodeError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pki::test_helpers::CaHierarchy;

    #[test]
    fn token_pairs_key_with_verified_chain() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let token = CryptoTokenAndChain::new(ca.issuing_key.clone(), ca.chain()).unwrap();
        assert_eq!(token.issuer_id(), IssuerId::from(ca.issuing_key.public_key()));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let result = CryptoTokenAndChain::new(ca.root_key.clone(), ca.chain());
        assert!(matches!(result, Err(TokenChainError::KeyMismatch)));
    }

    #[test]
    fn invalid_chain_is_rejected() {
        let ca1 = CaHierarchy::issuing_under_root("ca1");
        let ca2 = CaHierarchy::issuing_under_root("ca2");
        let chain = CertificateChain::from_leaf_to_root(vec![
            ca1.issuing_cert.clone(),
            ca2.root_cert.clone(),
        ]);
        let result = CryptoTokenAndChain::new(ca1.issuing_key.clone(), chain);
        assert!(matches!(result, Err(TokenChainError::Chain(_))));
    }

    #[test]
    fn issuer_id_hex_round_trips() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let id = IssuerId::from(ca.issuing_key.public_key());
        let parsed: IssuerId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
