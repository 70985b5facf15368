//! Revocation acceptance: is one revocation token acceptable evidence
//! about one certificate at a control time?
//!
//! The acceptance chain checks the token itself (consistency, signature,
//! digest algorithm, prospective signer chain) and then recursively
//! establishes the trustworthiness of every non-trusted certificate in the
//! signer chain, selecting revocation evidence for each in turn. The
//! visited set bounds that recursion; revisiting a token is a skip, not a
//! descent.

use crate::cache::BlockCache;
use crate::chain::{Chain, Check, CheckKind};
use crate::checks;
use crate::crs::run_crs;
use crate::state::{Env, RunState};
use arbiter_model::{Certificate, Conclusion, RevocationData};
use arbiter_policy::SubContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one revocation acceptance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacVerdict {
    pub conclusion: Conclusion,
    /// Production time of the checked token, used by the selector.
    pub production_time: DateTime<Utc>,
}

impl RacVerdict {
    /// An acceptable token concluded PASSED.
    pub fn is_acceptable(&self) -> bool {
        self.conclusion.is_passed()
    }
}

pub(crate) fn run_rac(
    env: Env<'_>,
    cert: &Certificate,
    revocation: &RevocationData,
    inherited_control_time: DateTime<Utc>,
    state: &mut RunState,
    cache: &mut BlockCache,
) -> RacVerdict {
    // POE tightens the instant this token is judged at, never extends it.
    let control_time = env.poe.control_time_for(&revocation.id, inherited_control_time);

    if let Some(hit) = cache.get(&revocation.id, &cert.id, control_time) {
        debug!(revocation = %revocation.id, certificate = %cert.id, "acceptance verdict served from cache");
        return hit.clone();
    }

    let constraints = &env.policy.revocation;
    let mut chain = Chain::new("revocation_acceptance");

    chain.execute(
        constraints.consistent.level,
        checks::revocation::consistent(env.diagnostic, cert, revocation),
    );
    chain.execute(
        constraints.signature_intact.level,
        checks::revocation::signature_intact(revocation),
    );
    chain.execute(
        constraints.digest_algorithm.level,
        checks::revocation::digest_algorithm(revocation, &constraints.digest_algorithm),
    );
    chain.execute(
        constraints.signer_chain_found.level,
        checks::revocation::signer_chain_found(env.diagnostic, revocation),
    );

    if !chain.concluded() {
        validate_signer_chain(env, revocation, control_time, state, cache, &mut chain);
    }

    let verdict = RacVerdict {
        conclusion: chain.conclude(),
        production_time: revocation.production_time,
    };
    cache.insert(
        revocation.id.clone(),
        cert.id.clone(),
        control_time,
        verdict.clone(),
    );
    verdict
}

/// Walk the revocation signer chain, establishing acceptable revocation
/// evidence for every non-trusted, non-exempt certificate in it.
fn validate_signer_chain(
    env: Env<'_>,
    revocation: &RevocationData,
    control_time: DateTime<Utc>,
    state: &mut RunState,
    cache: &mut BlockCache,
    chain: &mut Chain,
) {
    let constraints = &env.policy.revocation;

    for issuer_id in &revocation.signer_chain {
        let Some(issuer) = env.diagnostic.certificate(issuer_id) else {
            // Unreachable with a validated fact graph; stay total.
            continue;
        };

        if issuer.trusted {
            chain.note(
                CheckKind::RevocationSignerChainFound,
                format!("trust anchor {} reached", issuer.id),
            );
            break;
        }

        if state.is_visited(issuer_id) {
            if state.resolution(issuer_id) == Some(true) {
                debug!(certificate = %issuer_id, "already validated in this run, skipping");
                chain.note(
                    CheckKind::RevocationIssuerRevocationFound,
                    format!("certificate {issuer_id} already validated in this run"),
                );
                continue;
            }
            // Visited but never acceptably resolved: either still on the
            // recursion stack (a reference cycle) or previously found
            // unacceptable. Evidence is missing either way.
            chain.execute(
                constraints.issuer_revocation_found.level,
                Check::new(CheckKind::RevocationIssuerRevocationFound, false).with_detail(
                    format!("certificate {issuer_id} is part of an unresolved reference"),
                ),
            );
            if chain.concluded() {
                break;
            }
            continue;
        }
        state.visit(issuer_id);

        chain.execute(
            env.policy.ca_certificate.signature_intact.level,
            checks::revocation::issuer_signature_valid(issuer),
        );
        if chain.concluded() {
            break;
        }

        if issuer.ocsp_no_check {
            // id-pkix-ocsp-nocheck: the responder certificate is exempt
            // from requiring its own revocation evidence.
            debug!(certificate = %issuer_id, "id-pkix-ocsp-nocheck, revocation requirements skipped");
            chain.note(
                CheckKind::RevocationIssuerRevocationFound,
                format!("certificate {issuer_id} carries id-pkix-ocsp-nocheck, revocation exempt"),
            );
            continue;
        }

        let control_time = env.poe.control_time_for(issuer_id, control_time);
        let selection = run_crs(
            env,
            issuer,
            SubContext::CaCertificate,
            control_time,
            state,
            cache,
        );
        let found = Check::new(
            CheckKind::RevocationIssuerRevocationFound,
            selection.latest.is_some(),
        );
        let found = if selection.latest.is_some() {
            found
        } else {
            found.with_detail(format!("certificate {issuer_id}"))
        };
        chain.execute(constraints.issuer_revocation_found.level, found);
        if chain.concluded() {
            break;
        }
    }
}
