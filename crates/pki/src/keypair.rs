// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::str::FromStr;

use ed25519::KeypairBytes;
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, VerifyingKey};
use pkcs8::der::zeroize::Zeroize;
use pkcs8::pkcs5::pbes2;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, PrivateKeyInfo, SecretDocument};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::asn::{FromDerBytes, ToDerBytes};
use crate::common::Signed;
use crate::der_octet_string_newtype;
use crate::error::{DecodeError, EncodeError};
use crate::pem::{PemDecodable, PemEncodable, PemTagged};

/// An Ed25519 signing key with its public half. The private half never
/// leaves this type except in encrypted PKCS#8 form.
#[derive(Clone)]
pub struct KeyPair(SigningKey);

impl KeyPair {
    pub fn new_random() -> Self {
        let mut rng = OsRng;
        KeyPair(SigningKey::generate(&mut rng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }

    /// Signs the DER encoding of `data`, pairing the data with its signature.
    pub fn sign_der<T: ToDerBytes>(&self, data: T) -> Result<Signed<T>, EncodeError> {
        let bytes = data.to_der()?;
        let signature = self.sign(&bytes);
        Ok(Signed::new(data, signature))
    }

    /// Writes the keypair as an encrypted PKCS#8 PEM block.
    pub fn write_key<W: Write, T: AsRef<[u8]>>(
        self,
        writer: &mut W,
        passphrase: T,
    ) -> Result<(), KeyWriteError> {
        let pem = self.encrypt(passphrase)?.to_pem()?;
        write!(writer, "{}", pem)?;
        Ok(())
    }

    /// Loads a keypair from an encrypted PKCS#8 PEM block.
    pub fn load_key(
        pem: impl AsRef<[u8]>,
        passphrase: impl AsRef<[u8]>,
    ) -> Result<Self, KeyLoadError> {
        let encrypted = EncryptedKey::from_pem(pem)?;
        let mut bytes = KeypairBytes::from_pkcs8_encrypted_der(encrypted.0.as_bytes(), passphrase)
            .map_err(|_| KeyDecryptionError)?
            .to_bytes()
            .ok_or(KeyDecryptionError)?;
        let kp = SigningKey::from_keypair_bytes(&bytes).map_err(|_| KeyDecryptionError)?;
        bytes.zeroize();
        Ok(Self(kp))
    }

    // PBES2 with PBKDF2-SHA256 key derivation and AES-256-CBC. The
    // iteration count matches what the deployed key tooling writes.
    fn encrypt<B: AsRef<[u8]>>(&self, passphrase: B) -> Result<EncryptedKey, KeyEncryptionError> {
        let mut bytes = self.0.to_keypair_bytes();
        let mut kpb = KeypairBytes::from_bytes(&bytes);
        let der = kpb.to_pkcs8_der().map_err(|_| KeyEncryptionError)?;
        kpb.secret_key.zeroize();
        bytes.zeroize();

        let pki = PrivateKeyInfo::try_from(der.as_bytes()).map_err(|_| KeyEncryptionError)?;

        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let mut iv = [0u8; 16];
        OsRng.fill_bytes(&mut iv);

        let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(100_000, &salt, &iv)
            .map_err(|_| KeyEncryptionError)?;
        let doc = pki
            .encrypt_with_params(params, passphrase)
            .map_err(|_| KeyEncryptionError)?;

        Ok(EncryptedKey(doc))
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public key", &self.public_key())
            .field("private key", &"omitted for security")
            .finish()
    }
}

/// PKCS#8 encoded encrypted private key.
struct EncryptedKey(SecretDocument);

impl PemTagged for EncryptedKey {
    const TAG: &'static str = "SECUREDNA ENCRYPTED PRIVATE KEY";
}

impl ToDerBytes for EncryptedKey {
    fn to_der(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.0.as_bytes().into())
    }
}

impl FromDerBytes for EncryptedKey {
    fn from_der<B: AsRef<[u8]>>(data: B) -> Result<Self, DecodeError> {
        let doc = SecretDocument::try_from(data.as_ref()).map_err(|_| DecodeError::ParseError)?;
        Ok(Self(doc))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct PublicKey(pub(crate) [u8; Self::LEN]);

impl PublicKey {
    pub const LEN: usize = 32;

    pub fn verify(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), SignatureVerificationError> {
        let pk = VerifyingKey::from_bytes(&self.0).map_err(|_| KeyParseError)?;
        let sig = Ed25519Signature::from_bytes(&signature.0);
        pk.verify_strict(message, &sig)
            .map_err(|_| SignatureVerificationError::NotVerified)
    }

    pub fn to_bytes(self) -> [u8; Self::LEN] {
        self.0
    }
}

der_octet_string_newtype!(PublicKey, PublicKey::LEN);

impl PemTagged for PublicKey {
    const TAG: &'static str = "SECUREDNA PUBLIC KEY";
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let x = hex::decode(s)
            .map_err(|_| KeyParseError)?
            .try_into()
            .map_err(|_| KeyParseError)?;
        Ok(Self(x))
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_string()).finish()
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Signature(pub(crate) [u8; Self::LEN]);

impl Signature {
    pub const LEN: usize = 64;
}

der_octet_string_newtype!(Signature, Signature::LEN);

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let x = hex::decode(s)
            .map_err(|_| SignatureParseError)?
            .try_into()
            .map_err(|_| SignatureParseError)?;
        Ok(Self(x))
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_string()).finish()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Error, Debug)]
pub enum SignatureVerificationError {
    /// Deliberately unspecific, to not leak details about the signature or keys.
    #[error("unable to verify the signature")]
    NotVerified,
    #[error(transparent)]
    KeyParse(#[from] KeyParseError),
}

#[derive(Error, Debug)]
pub enum KeyLoadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Decrypt(#[from] KeyDecryptionError),
}

#[derive(Error, Debug)]
pub enum KeyWriteError {
    #[error("private key write error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Encrypt(#[from] KeyEncryptionError),
}

#[derive(Debug, Error, PartialEq)]
#[error("unable to encrypt key")]
pub struct KeyEncryptionError;

#[derive(Debug, Error, PartialEq)]
#[error("unable to decrypt key")]
pub struct KeyDecryptionError;

#[derive(Error, Debug)]
#[error("key could not be parsed")]
pub struct KeyParseError;

#[derive(Error, Debug)]
#[error("signature could not be parsed")]
pub struct SignatureParseError;

#[cfg(test)]
mod tests {
    use super::KeyPair;

    #[test]
    fn can_write_and_load_encrypted_keypair() {
        let passphrase = "aV8qLpw31xTsmN2";
        let kp = KeyPair::new_random();
        let public_key = kp.public_key();

        let mut backup = vec![];
        kp.write_key(&mut backup, passphrase).unwrap();

        let loaded = KeyPair::load_key(backup, passphrase).unwrap();
        assert_eq!(loaded.public_key(), public_key);
    }

    #[test]
    fn loading_with_incorrect_passphrase_generates_error() {
        let kp = KeyPair::new_random();
        let mut backup = vec![];
        kp.write_key(&mut backup, "correct passphrase").unwrap();

        KeyPair::load_key(backup, "wrong passphrase")
            .expect_err("loading with incorrect passphrase should error");
    }

    #[test]
    fn signature_verifies_against_signing_public_key_only() {
        let kp = KeyPair::new_random();
        let other = KeyPair::new_random();
        let message = b"status query";

        let signature = kp.sign(message);
        kp.public_key().verify(message, &signature).unwrap();
        other
            .public_key()
            .verify(message, &signature)
            .expect_err("signature should not verify under an unrelated key");
    }

    #[test]
    fn signature_does_not_verify_for_tampered_message() {
        let kp = KeyPair::new_random();
        let signature = kp.sign(b"original");
        kp.public_key()
            .verify(b"tampered", &signature)
            .expect_err("tampered message should not verify");
    }
}
