//! Externally-owned memo of acceptance verdicts for one validation batch.

use crate::rac::RacVerdict;
use arbiter_model::TokenId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VerdictKey {
    revocation: TokenId,
    certificate: TokenId,
    control_time: DateTime<Utc>,
}

/// Memo of revocation acceptance verdicts, shared by sibling validations
/// in one batch (e.g. several signatures reusing a CA's revocation data).
///
/// The cache is owned by the caller and passed `&mut` into each top-level
/// validation; it is never global. Keys include the control time, so runs
/// judged at different instants never observe each other's verdicts.
#[derive(Debug, Default)]
pub struct BlockCache {
    verdicts: HashMap<VerdictKey, RacVerdict>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(
        &self,
        revocation: &TokenId,
        certificate: &TokenId,
        control_time: DateTime<Utc>,
    ) -> Option<&RacVerdict> {
        self.verdicts.get(&VerdictKey {
            revocation: revocation.clone(),
            certificate: certificate.clone(),
            control_time,
        })
    }

    pub(crate) fn insert(
        &mut self,
        revocation: TokenId,
        certificate: TokenId,
        control_time: DateTime<Utc>,
        verdict: RacVerdict,
    ) {
        self.verdicts.insert(
            VerdictKey {
                revocation,
                certificate,
                control_time,
            },
            verdict,
        );
    }

    /// Number of memoized verdicts.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}
