// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use pki::SerialId;

use crate::token_chain::IssuerId;

/// A single revocation: which issuer revoked which serial, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub issuer: IssuerId,
    pub serial: SerialId,
    pub revoked_at: i64,
}

/// The responder's revocation knowledge. An issuer is *covered* when this
/// list is authoritative for it; serials of a covered issuer that carry
/// no record are good, while uncovered issuers can only be answered with
/// an unknown status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevocationList {
    covered_issuers: Vec<IssuerId>,
    records: Vec<RevocationRecord>,
}

impl RevocationList {
    /// Marks an issuer as covered without revoking anything for it.
    pub fn with_covered_issuer(mut self, issuer: IssuerId) -> Self {
        if !self.covered_issuers.contains(&issuer) {
            self.covered_issuers.push(issuer);
        }
        self
    }

    /// Adds a revocation record; its issuer becomes covered.
    pub fn with_record(mut self, record: RevocationRecord) -> Self {
        if !self.covered_issuers.contains(&record.issuer) {
            self.covered_issuers.push(record.issuer);
        }
        self.records.push(record);
        self
    }

    pub fn covers(&self, issuer: &IssuerId) -> bool {
        self.covered_issuers.contains(issuer)
    }

    pub fn revoked_at(&self, issuer: &IssuerId, serial: &SerialId) -> Option<i64> {
        self.records
            .iter()
            .find(|r| &r.issuer == issuer && &r.serial == serial)
            .map(|r| r.revoked_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pki::KeyPair;

    fn issuer() -> IssuerId {
        IssuerId::from(KeyPair::new_random().public_key())
    }

    #[test]
    fn record_marks_issuer_as_covered() {
        let ca = issuer();
        let serial = SerialId::new_random();
        let list = RevocationList::default().with_record(RevocationRecord {
            issuer: ca,
            serial,
            revoked_at: 1_700_000_000,
        });

        assert!(list.covers(&ca));
        assert_eq!(list.revoked_at(&ca, &serial), Some(1_700_000_000));
    }

    #[test]
    fn unrecorded_serial_of_covered_issuer_is_not_revoked() {
        let ca = issuer();
        let list = RevocationList::default().with_covered_issuer(ca);

        assert!(list.covers(&ca));
        assert_eq!(list.revoked_at(&ca, &SerialId::new_random()), None);
    }

    #[test]
    fn unlisted_issuer_is_not_covered() {
        let list = RevocationList::default().with_covered_issuer(issuer());
        assert!(!list.covers(&issuer()));
    }
}
