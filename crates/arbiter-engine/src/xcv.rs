//! Certificate chain validation: walk end-entity to trust anchor, select
//! revocation evidence for every non-trusted certificate, fold everything
//! into one chain conclusion.

use crate::cache::BlockCache;
use crate::chain::{Chain, Check, CheckKind};
use crate::checks;
use crate::crs::run_crs;
use crate::state::{Env, RunState};
use arbiter_model::{
    Certificate, Conclusion, DiagnosticData, FactError, Indication, PoeIndex, TokenId,
};
use arbiter_policy::{SubContext, ValidationPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation outcome for one certificate of the walked chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateReport {
    pub certificate: TokenId,
    pub sub_context: SubContext,
    /// The walk stopped here: the certificate is accepted a priori.
    pub trust_anchor: bool,
    /// The certificate is self-signed.
    pub self_signed: bool,
    pub conclusion: Conclusion,
    /// The revocation token the selector picked, when one was acceptable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_revocation: Option<TokenId>,
}

/// The conclusion tree of one top-level chain validation, keyed by token
/// identifier. Consumed by an external report builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XcvReport {
    /// The validated end-entity certificate.
    pub certificate: TokenId,
    /// Caller-supplied validation instant (before per-token POE tightening).
    pub control_time: DateTime<Utc>,
    /// The folded chain-level conclusion.
    pub conclusion: Conclusion,
    /// Per-certificate sub-reports, in walk order.
    pub certificates: Vec<CertificateReport>,
}

/// Progress of the chain walk. Terminal once a FAIL-level failure is
/// recorded or the trust anchor is reached with everything acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    NotStarted,
    WalkingChain(usize),
    Concluded(Indication),
}

/// Validate the certificate chain of `certificate` against the policy at
/// `control_time`.
///
/// The diagnostic data, policy and POE index are read-only; `cache` is the
/// caller-owned acceptance memo for the current batch. Every call creates
/// its own fresh visited set, so independent calls may run concurrently
/// over the same facts.
pub fn validate_certificate_chain(
    diagnostic: &DiagnosticData,
    certificate: &TokenId,
    policy: &ValidationPolicy,
    poe: &PoeIndex,
    control_time: DateTime<Utc>,
    cache: &mut BlockCache,
) -> Result<XcvReport, FactError> {
    let end_entity = diagnostic
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
    let mut chain = Chain::new("certificate_chain_validation");
    let mut reports = Vec::new();
    let mut walk_state = WalkState::NotStarted;
    debug!(certificate = %end_entity.id, state = ?walk_state, "certificate chain validation");

    // The walk list: the end-entity followed by its issuance chain.
    let mut walk: Vec<&Certificate> = vec![end_entity];
    for id in &end_entity.chain {
        if let Some(cert) = diagnostic.certificate(id) {
            walk.push(cert);
        }
    }

    let reaches_anchor = walk.iter().any(|cert| cert.trusted);
    let prospective = Check::new(CheckKind::ProspectiveCertificateChain, reaches_anchor);
    let prospective = if reaches_anchor {
        prospective
    } else {
        prospective.with_detail(format!("certificate {}", end_entity.id))
    };
    chain.execute(policy.prospective_certificate_chain.level, prospective);

    for (index, cert) in walk.iter().enumerate() {
        if chain.concluded() {
            break;
        }
        walk_state = WalkState::WalkingChain(index);
        debug!(certificate = %cert.id, state = ?walk_state, "walking certificate chain");

        let sub_context = if index == 0 {
            SubContext::SigningCert
        } else {
            SubContext::CaCertificate
        };

        if cert.trusted {
            reports.push(CertificateReport {
                certificate: cert.id.clone(),
                sub_context,
                trust_anchor: true,
                self_signed: cert.self_signed,
                conclusion: Conclusion::passed(),
                selected_revocation: None,
            });
            break;
        }

        let (conclusion, selected_revocation) =
            validate_certificate(env, cert, sub_context, control_time, &mut state, cache);
        chain.absorb(cert.id.as_str(), &conclusion);
        reports.push(CertificateReport {
            certificate: cert.id.clone(),
            sub_context,
            trust_anchor: false,
            self_signed: cert.self_signed,
            conclusion,
            selected_revocation,
        });
    }

    let conclusion = chain.conclude();
    walk_state = WalkState::Concluded(conclusion.indication);
    debug!(
        certificate = %end_entity.id,
        state = ?walk_state,
        sub_indication = ?conclusion.sub_indication,
        "certificate chain validation concluded"
    );

    Ok(XcvReport {
        certificate: end_entity.id.clone(),
        control_time,
        conclusion,
        certificates: reports,
    })
}

/// The per-certificate sub-chain: signature, validity, key usage, crypto,
/// then the revocation block unless the certificate is exempt.
fn validate_certificate(
    env: Env<'_>,
    cert: &Certificate,
    sub_context: SubContext,
    inherited_control_time: DateTime<Utc>,
    state: &mut RunState,
    cache: &mut BlockCache,
) -> (Conclusion, Option<TokenId>) {
    let constraints = env.policy.certificate_constraints(sub_context);
    let control_time = env.poe.control_time_for(&cert.id, inherited_control_time);
    state.visit(&cert.id);

    let mut chain = Chain::new("certificate_validation");
    let mut selected_revocation = None;

    chain.execute(
        constraints.signature_intact.level,
        checks::certificate::signature_valid(cert),
    );
    chain.execute(
        constraints.in_validity_range.level,
        checks::certificate::validity_range(cert, control_time),
    );
    chain.execute(
        constraints.key_usage.level,
        checks::certificate::key_usage(cert, &constraints.key_usage),
    );
    chain.execute(
        constraints.digest_algorithm.level,
        checks::certificate::digest_algorithm(cert, &constraints.digest_algorithm),
    );

    if cert.ocsp_no_check {
        chain.note(
            CheckKind::RevocationDataAvailable,
            format!("certificate {} carries id-pkix-ocsp-nocheck, revocation exempt", cert.id),
        );
    } else if !constraints.require_revocation_data {
        chain.note(
            CheckKind::RevocationDataAvailable,
            "revocation data not required by policy",
        );
    } else {
        chain.execute(
            constraints.revocation_data_available.level,
            checks::certificate::revocation_data_available(cert),
        );

        if !chain.concluded() && !cert.revocations.is_empty() {
            let selection = run_crs(env, cert, sub_context, control_time, state, cache);
            chain.absorb(cert.id.as_str(), &selection.conclusion);

            if let Some(latest) = selection.latest {
                if let Some(revocation) = env.diagnostic.revocation(&latest) {
                    chain.execute(
                        constraints.not_revoked.level,
                        checks::certificate::not_revoked(revocation, control_time),
                    );
                    chain.execute(
                        constraints.not_on_hold.level,
                        checks::certificate::not_on_hold(revocation, control_time),
                    );
                    chain.execute(
                        constraints.revocation_freshness.level,
                        checks::certificate::revocation_fresh(
                            revocation,
                            control_time,
                            constraints.revocation_max_age_seconds,
                        ),
                    );
                }
                selected_revocation = Some(latest);
            }
        }
    }

    (chain.conclude(), selected_revocation)
}
