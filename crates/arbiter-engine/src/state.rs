//! Per-run mutable state, threaded explicitly through the recursion.

use arbiter_model::{DiagnosticData, PoeIndex, TokenId};
use arbiter_policy::ValidationPolicy;
use std::collections::{BTreeMap, HashSet};

/// Read-only facts shared by every block of one validation run.
#[derive(Clone, Copy)]
pub(crate) struct Env<'a> {
    pub diagnostic: &'a DiagnosticData,
    pub policy: &'a ValidationPolicy,
    pub poe: &'a PoeIndex,
}

/// Mutable state owned by one top-level validation call.
///
/// `visited` is the termination guard: a token enters it exactly once,
/// before its checks run, and never leaves within the run, so recursion is
/// bounded by the finite id space regardless of reference topology.
/// `resolved` remembers whether a certificate's revocation selection found
/// an acceptable token, so a later encounter of a visited certificate can
/// distinguish "already validated fine" (normal skip) from "still on the
/// recursion stack or found unacceptable" (an unresolved reference).
#[derive(Debug, Default)]
pub(crate) struct RunState {
    visited: HashSet<TokenId>,
    resolved: BTreeMap<TokenId, bool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token visited. Returns `true` when the token was not yet
    /// visited in this run.
    pub fn visit(&mut self, id: &TokenId) -> bool {
        self.visited.insert(id.clone())
    }

    pub fn is_visited(&self, id: &TokenId) -> bool {
        self.visited.contains(id)
    }

    /// Record the outcome of a certificate's revocation selection.
    pub fn set_resolved(&mut self, id: TokenId, acceptable: bool) {
        self.resolved.insert(id, acceptable);
    }

    /// Outcome of a previous selection for the certificate, if one
    /// completed in this run.
    pub fn resolution(&self, id: &TokenId) -> Option<bool> {
        self.resolved.get(id).copied()
    }
}
