// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use rasn::{AsnType, Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::der_octet_string_newtype;
use crate::keypair::Signature;

/// A unique 128-bit identifier, stored as 16 octets. Uniqueness is not
/// guaranteed, but a collision is extremely unlikely.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct SerialId([u8; Self::LEN]);

impl SerialId {
    const LEN: usize = 16;

    pub fn new_random() -> Self {
        let mut bytes = [0u8; Self::LEN];
        OsRng.fill_bytes(&mut bytes);
        SerialId(bytes)
    }
}

der_octet_string_newtype!(SerialId, SerialId::LEN);

impl From<[u8; SerialId::LEN]> for SerialId {
    fn from(value: [u8; SerialId::LEN]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for SerialId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for SerialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for SerialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SerialId").field(&self.to_string()).finish()
    }
}

#[derive(Debug, Error)]
#[error("could not parse serial id from hex value")]
pub struct SerialIdParseError;

impl FromStr for SerialId {
    type Err = SerialIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; Self::LEN] = hex::decode(s)
            .map_err(|_| SerialIdParseError)?
            .try_into()
            .map_err(|_| SerialIdParseError)?;
        Ok(SerialId(bytes))
    }
}

/// The validity window of a certificate, as UTC unix timestamps.
#[derive(
    AsnType,
    Decode,
    Encode,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[rasn(automatic_tags)]
pub struct Validity {
    pub not_before: i64,
    pub not_after: i64,
}

impl Validity {
    pub fn valid_for_days(days: i64) -> Result<Self, ValidityError> {
        if days <= 0 {
            return Err(ValidityError::InsufficientDaysValid);
        }
        let now = OffsetDateTime::now_utc();
        let expires = now + Duration::days(days);
        Ok(Self {
            not_before: now.unix_timestamp(),
            not_after: expires.unix_timestamp(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidityError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if now < self.not_before {
            Err(ValidityError::NotYetValid)
        } else if now > self.not_after {
            Err(ValidityError::Expired)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidityError {
    #[error("must be valid for one day or longer")]
    InsufficientDaysValid,
    #[error("not yet valid")]
    NotYetValid,
    #[error("expired")]
    Expired,
}

/// A DER-encodable value paired with a signature over its DER encoding.
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
pub struct Signed<T> {
    data: T,
    signature: Signature,
}

impl<T> Signed<T> {
    pub fn new(data: T, signature: Signature) -> Self {
        Self { data, signature }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn::ToDerBytes;

    #[test]
    fn serial_id_der_encoding_is_expected_length() {
        let id = SerialId::new_random();
        let encoded = id.to_der().unwrap();
        assert_eq!(encoded.len(), SerialId::LEN + 2);
    }

    #[test]
    fn serial_id_hex_round_trips() {
        let id = SerialId::new_random();
        let parsed: SerialId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn validity_window_must_be_at_least_one_day() {
        assert_eq!(
            Validity::valid_for_days(0),
            Err(ValidityError::InsufficientDaysValid)
        );
        assert!(Validity::valid_for_days(1).is_ok());
    }

    #[test]
    fn expired_window_fails_validation() {
        let validity = Validity {
            not_before: 0,
            not_after: 1,
        };
        assert_eq!(validity.validate(), Err(ValidityError::Expired));
    }
}
