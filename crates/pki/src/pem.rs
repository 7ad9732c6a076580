// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use pem::{encode_config, parse, EncodeConfig, LineEnding, Pem};

use crate::asn::{FromDerBytes, ToDerBytes};
use crate::error::{DecodeError, EncodeError};

/// The fixed PEM armor tag of an encodable type. Decoding checks the tag
/// before touching the DER contents, so artifacts of one kind cannot be
/// smuggled in as another.
pub trait PemTagged {
    const TAG: &'static str;
}

pub trait PemEncodable: ToDerBytes + PemTagged {
    /// Converts to a PEM string.
    fn to_pem(&self) -> Result<String, EncodeError>;
}

pub trait PemDecodable: FromDerBytes + Sized + PemTagged {
    fn from_pem<T: AsRef<[u8]>>(data: T) -> Result<Self, DecodeError>;
}

impl<T: ToDerBytes + PemTagged> PemEncodable for T {
    fn to_pem(&self) -> Result<String, EncodeError> {
        let contents = self.to_der()?;
        let pem = Pem::new(T::TAG, contents);
        let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
        Ok(encode_config(&pem, config))
    }
}

impl<T: FromDerBytes + PemTagged> PemDecodable for T {
    fn from_pem<B: AsRef<[u8]>>(data: B) -> Result<Self, DecodeError> {
        let pem = parse(data)?;
        if pem.tag() != T::TAG {
            return Err(DecodeError::UnexpectedPemTag(
                T::TAG.to_owned(),
                pem.tag().to_owned(),
            ));
        }
        T::from_der(pem.contents())
    }
}
