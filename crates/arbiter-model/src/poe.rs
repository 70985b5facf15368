use crate::token::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proof-of-existence index: earliest externally proven existence time per
/// token, established by the (out-of-scope) timestamp validation subsystem.
///
/// A POE can only tighten the effective control time: a timestamp proves a
/// token existed at or before its own time, so the instant freshness is
/// judged at moves backwards, never forwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeIndex {
    times: BTreeMap<TokenId, DateTime<Utc>>,
}

impl PoeIndex {
    /// Empty index: every control time passes through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proof, keeping the earliest time per token.
    pub fn with_proof(mut self, id: impl Into<TokenId>, at: DateTime<Utc>) -> Self {
        let id = id.into();
        match self.times.get(&id) {
            Some(existing) if *existing <= at => {}
            _ => {
                self.times.insert(id, at);
            }
        }
        self
    }

    /// Earliest proven existence time for a token, if any.
    pub fn proven_time(&self, id: &TokenId) -> Option<DateTime<Utc>> {
        self.times.get(id).copied()
    }

    /// Effective control time for a token: the inherited control time,
    /// tightened by the token's POE when one exists and is earlier.
    pub fn control_time_for(&self, id: &TokenId, inherited: DateTime<Utc>) -> DateTime<Utc> {
        match self.proven_time(id) {
            Some(proven) if proven < inherited => proven,
            _ => inherited,
        }
    }
}
