//! Constraint-chain certificate and revocation validation engine.
//!
//! The engine consumes a pre-built fact graph ([`arbiter_model`]), a
//! constraint policy ([`arbiter_policy`]) and a proof-of-existence index,
//! and produces a structured verdict: an Indication, a reason code, and
//! the per-check message trail. It performs no I/O and no cryptography —
//! signature outcomes arrive pre-computed — and it is total: adversarial
//! or incomplete facts fold into FAIL-level conclusions, never panics.
//!
//! Entry points:
//! - [`validate_certificate_chain`] — the chain walk (XCV);
//! - [`select_certificate_revocation`] — revocation selection for one
//!   certificate (CRS);
//! - [`check_revocation_acceptance`] — acceptance of one revocation token
//!   for one certificate (RAC).
//!
//! Independent top-level calls share only read-only inputs plus the
//! caller-owned [`BlockCache`]; each creates its own fresh visited set, so
//! a batch may fan validations out across threads with per-thread caches.

pub mod cache;
pub mod chain;
mod checks;
pub mod crs;
pub mod rac;
mod state;
pub mod xcv;

pub use cache::BlockCache;
pub use chain::{Chain, Check, CheckKind};
pub use crs::CrsOutcome;
pub use rac::RacVerdict;
pub use xcv::{validate_certificate_chain, CertificateReport, XcvReport};

use arbiter_model::{DiagnosticData, FactError, PoeIndex, TokenId};
use arbiter_policy::{SubContext, ValidationPolicy};
use chrono::{DateTime, Utc};
use state::{Env, RunState};

/// Run revocation selection (CRS) for one certificate, with a fresh
/// visited set.
pub fn select_certificate_revocation(
    diagnostic: &DiagnosticData,
    certificate: &TokenId,
    sub_context: SubContext,
    policy: &ValidationPolicy,
    poe: &PoeIndex,
    control_time: DateTime<Utc>,
    cache: &mut BlockCache,
) -> Result<CrsOutcome, FactError> {
    let cert = diagnostic
        .certificate(certificate)
        .ok_or_else(|| FactError::UnknownTarget {
            id: certificate.clone(),
        })?;
    let env = Env {
        diagnostic,
        policy,
        poe,
    };
    let mut state = RunState::new();
    state.visit(certificate);
    let control_time = poe.control_time_for(certificate, control_time);
    Ok(crs::run_crs(env, cert, sub_context, control_time, &mut state, cache))
}

/// Run the acceptance check (RAC) for one revocation token against one
/// certificate, with a fresh visited set.
pub fn check_revocation_acceptance(
    diagnostic: &DiagnosticData,
    certificate: &TokenId,
    revocation: &TokenId,
    policy: &ValidationPolicy,
    poe: &PoeIndex,
    control_time: DateTime<Utc>,
    cache: &mut BlockCache,
) -> Result<RacVerdict, FactError> {
    let cert = diagnostic
        .certificate(certificate)
        .ok_or_else(|| FactError::UnknownTarget {
            id: certificate.clone(),
        })?;
    let rev = diagnostic
        .revocation(revocation)
        .ok_or_else(|| FactError::UnknownTarget {
            id: revocation.clone(),
        })?;
    let env = Env {
        diagnostic,
        policy,
        poe,
    };
    let mut state = RunState::new();
    state.visit(certificate);
    Ok(rac::run_rac(env, cert, rev, control_time, &mut state, cache))
}
