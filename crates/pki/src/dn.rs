// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

use rasn::de::Error;
use rasn::types::Utf8String;
use rasn::{AsnType, Decode, Encode, Tag};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// The distinguished-name components understood by the issuance pipeline.
/// Closed set; unrecognized components are rejected at the edge rather
/// than carried around as opaque strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub enum DnComponentKind {
    CommonName,
    OrganizationalUnit,
    Organization,
    Country,
    Email,
}

impl DnComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnComponentKind::CommonName => "CN",
            DnComponentKind::OrganizationalUnit => "OU",
            DnComponentKind::Organization => "O",
            DnComponentKind::Country => "C",
            DnComponentKind::Email => "EMAIL",
        }
    }
}

impl Display for DnComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("could not parse DN component kind, expected one of (CN, OU, O, C, EMAIL)")]
pub struct DnComponentKindParseError;

impl FromStr for DnComponentKind {
    type Err = DnComponentKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CN" => Ok(DnComponentKind::CommonName),
            "OU" => Ok(DnComponentKind::OrganizationalUnit),
            "O" => Ok(DnComponentKind::Organization),
            "C" => Ok(DnComponentKind::Country),
            "EMAIL" => Ok(DnComponentKind::Email),
            _ => Err(DnComponentKindParseError),
        }
    }
}

impl AsnType for DnComponentKind {
    const TAG: Tag = Tag::UTF8_STRING;
}

impl Encode for DnComponentKind {
    fn encode_with_tag_and_constraints<E: rasn::Encoder>(
        &self,
        encoder: &mut E,
        tag: Tag,
        constraints: rasn::types::Constraints,
    ) -> Result<(), E::Error> {
        self.as_str()
            .to_string()
            .encode_with_tag_and_constraints(encoder, tag, constraints)
    }
}

impl Decode for DnComponentKind {
    fn decode_with_tag_and_constraints<D: rasn::Decoder>(
        decoder: &mut D,
        tag: Tag,
        constraints: rasn::types::Constraints,
    ) -> Result<Self, D::Error> {
        let name = Utf8String::decode_with_tag_and_constraints(decoder, tag, constraints)?;
        name.parse()
            .map_err(|_| D::Error::custom(format!("unexpected DN component kind: {}", name)))
    }
}

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
pub struct DnComponent {
    pub kind: DnComponentKind,
    pub value: String,
}

/// An ordered list of distinguished-name components. Order is preserved
/// as given by the subject; at most one component per kind.
#[derive(
    AsnType,
    Decode,
    Encode,
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[rasn(automatic_tags)]
pub struct SubjectDn {
    components: Vec<DnComponent>,
}

impl SubjectDn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, kind: DnComponentKind, value: impl Into<String>) -> Self {
        self.set(kind, value);
        self
    }

    /// Sets a component, replacing any existing component of the same kind.
    pub fn set(&mut self, kind: DnComponentKind, value: impl Into<String>) {
        let value = value.into();
        match self.components.iter_mut().find(|c| c.kind == kind) {
            Some(component) => component.value = value,
            None => self.components.push(DnComponent { kind, value }),
        }
    }

    pub fn get(&self, kind: DnComponentKind) -> Option<&str> {
        self.components
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    pub fn components(&self) -> &[DnComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Display for SubjectDn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", component.kind, component.value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn::{FromDerBytes, ToDerBytes};

    #[test]
    fn set_replaces_existing_component_of_same_kind() {
        let mut dn = SubjectDn::new()
            .with_component(DnComponentKind::CommonName, "ocsp-signer")
            .with_component(DnComponentKind::OrganizationalUnit, "Ops");

        dn.set(DnComponentKind::OrganizationalUnit, "Engineering");

        assert_eq!(
            dn.get(DnComponentKind::OrganizationalUnit),
            Some("Engineering")
        );
        assert_eq!(dn.components().len(), 2);
    }

    #[test]
    fn display_renders_components_in_order() {
        let dn = SubjectDn::new()
            .with_component(DnComponentKind::CommonName, "issuing-ca")
            .with_component(DnComponentKind::Organization, "SecureDNA");

        assert_eq!(dn.to_string(), "CN=issuing-ca, O=SecureDNA");
    }

    #[test]
    fn dn_der_round_trips() {
        let dn = SubjectDn::new()
            .with_component(DnComponentKind::CommonName, "issuing-ca")
            .with_component(DnComponentKind::Country, "CH");

        let der = dn.to_der().unwrap();
        let decoded = SubjectDn::from_der(der).unwrap();
        assert_eq!(dn, decoded);
    }

    #[test]
    fn unknown_component_kind_fails_to_parse() {
        assert!("CN".parse::<DnComponentKind>().is_ok());
        assert!("UID".parse::<DnComponentKind>().is_err());
    }
}
