//! Revocation selection: pick the best acceptable token for a certificate.

use crate::cache::BlockCache;
use crate::chain::{Chain, Check, CheckKind};
use crate::rac::run_rac;
use crate::state::{Env, RunState};
use arbiter_model::{Certificate, Conclusion, RevocationKind, TokenId};
use arbiter_policy::{RevocationTieBreak, SubContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of revocation selection for one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsOutcome {
    pub conclusion: Conclusion,
    /// The latest acceptable token, when one exists.
    pub latest: Option<TokenId>,
    /// Acceptance outcome per candidate, in the certificate's documented
    /// candidate order.
    pub verdicts: Vec<(TokenId, bool)>,
}

#[derive(Debug, Clone)]
struct Candidate {
    id: TokenId,
    kind: RevocationKind,
    production_time: DateTime<Utc>,
}

pub(crate) fn run_crs(
    env: Env<'_>,
    cert: &Certificate,
    sub_context: SubContext,
    control_time: DateTime<Utc>,
    state: &mut RunState,
    cache: &mut BlockCache,
) -> CrsOutcome {
    let constraints = env.policy.certificate_constraints(sub_context);
    let mut chain = Chain::new("certificate_revocation_selection");
    let mut verdicts = Vec::with_capacity(cert.revocations.len());
    let mut latest: Option<Candidate> = None;

    for revocation_id in &cert.revocations {
        let Some(revocation) = env.diagnostic.revocation(revocation_id) else {
            // Unreachable with a validated fact graph; stay total.
            continue;
        };
        let verdict = run_rac(env, cert, revocation, control_time, state, cache);
        let acceptable = verdict.is_acceptable();
        debug!(
            certificate = %cert.id,
            revocation = %revocation_id,
            acceptable,
            "revocation acceptance evaluated"
        );
        verdicts.push((revocation_id.clone(), acceptable));
        if acceptable {
            let candidate = Candidate {
                id: revocation_id.clone(),
                kind: revocation.kind,
                production_time: verdict.production_time,
            };
            latest = Some(select_latest(
                latest,
                candidate,
                env.policy.revocation_tie_break,
            ));
        }
    }

    state.set_resolved(cert.id.clone(), latest.is_some());
    if let Some(candidate) = &latest {
        debug!(
            certificate = %cert.id,
            revocation = %candidate.id,
            produced_at = %candidate.production_time,
            "latest acceptable revocation selected"
        );
    }

    let found = Check::new(CheckKind::AcceptableRevocationFound, latest.is_some());
    let found = if latest.is_some() {
        found
    } else {
        found.with_detail(format!("certificate {}", cert.id))
    };
    chain.execute(constraints.acceptable_revocation_found.level, found);

    CrsOutcome {
        conclusion: chain.conclude(),
        latest: latest.map(|candidate| candidate.id),
        verdicts,
    }
}

/// Strictly later production time wins; equal times resolve by the policy
/// tie-break relative to the documented candidate order.
fn select_latest(
    current: Option<Candidate>,
    candidate: Candidate,
    tie_break: RevocationTieBreak,
) -> Candidate {
    let Some(current) = current else {
        return candidate;
    };
    if candidate.production_time > current.production_time {
        return candidate;
    }
    if candidate.production_time == current.production_time {
        let prefer_candidate = match tie_break {
            RevocationTieBreak::KeepFirst => false,
            RevocationTieBreak::PreferOcsp => {
                candidate.kind == RevocationKind::Ocsp && current.kind == RevocationKind::Crl
            }
            RevocationTieBreak::PreferCrl => {
                candidate.kind == RevocationKind::Crl && current.kind == RevocationKind::Ocsp
            }
        };
        if prefer_candidate {
            return candidate;
        }
    }
    current
}
