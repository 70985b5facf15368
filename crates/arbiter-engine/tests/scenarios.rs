//! End-to-end scenarios over the XCV / CRS / RAC blocks.

mod common;

use arbiter_engine::{
    check_revocation_acceptance, select_certificate_revocation, validate_certificate_chain,
    BlockCache,
};
use arbiter_model::{
    CertificateStatus, DiagnosticData, Indication, PoeIndex, SubIndication, TokenId,
};
use arbiter_policy::{Constraint, SubContext, ValidationPolicy};
use common::{crl, day, entity, init_tracing, ocsp, trust_anchor};

/// One certificate, one intact revocation token signed by the trust
/// anchor: everything passes and the selector exposes the token.
#[test]
fn single_acceptable_revocation_passes() {
    init_tracing();
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
        ],
        vec![ocsp("r1", "c", "ta", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();

    assert!(report.conclusion.is_passed());
    assert_eq!(report.certificates.len(), 2);
    assert_eq!(
        report.certificates[0].selected_revocation,
        Some(TokenId::new("r1"))
    );
    assert!(report.certificates[1].trust_anchor);
    assert!(report.certificates[1].self_signed);
}

/// Two candidates: a malformed one and a newer intact one. The malformed
/// token is rejected by its acceptance check, the intact one is selected,
/// and the overall chain still passes.
#[test]
fn malformed_candidate_is_outvoted_by_intact_one() {
    init_tracing();
    let mut broken = ocsp("r1", "c", "ta", 8);
    broken.signature_intact = false;
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1").with_revocation("r2"),
        ],
        vec![broken, ocsp("r2", "c", "ta", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let rejected = check_revocation_acceptance(
        &diagnostic,
        &TokenId::new("c"),
        &TokenId::new("r1"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(!rejected.is_acceptable());
    assert_eq!(
        rejected.conclusion.sub_indication,
        Some(SubIndication::CertificateChainGeneralFailure)
    );

    let accepted = check_revocation_acceptance(
        &diagnostic,
        &TokenId::new("c"),
        &TokenId::new("r2"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(accepted.is_acceptable());

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(report.conclusion.is_passed());
    assert_eq!(
        report.certificates[0].selected_revocation,
        Some(TokenId::new("r2"))
    );
}

/// The sole revocation token is signed by a non-trusted certificate that
/// has no revocation evidence of its own: the acceptance check fails with
/// the dedicated reason code and the selection cannot conclude PASSED.
#[test]
fn revocation_issuer_without_own_evidence_is_rejected() {
    init_tracing();
    let responder = entity("d", "ta"); // no revocation data, no exemption
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
            responder,
        ],
        vec![ocsp("r1", "c", "d", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let verdict = check_revocation_acceptance(
        &diagnostic,
        &TokenId::new("c"),
        &TokenId::new("r1"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(!verdict.is_acceptable());
    assert_eq!(
        verdict.conclusion.sub_indication,
        Some(SubIndication::NoRevocationDataForRevocationIssuer)
    );

    let mut cache = BlockCache::new();
    let selection = select_certificate_revocation(
        &diagnostic,
        &TokenId::new("c"),
        SubContext::SigningCert,
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(selection.latest.is_none());
    assert!(!selection.conclusion.is_passed());
    assert_eq!(
        selection.conclusion.sub_indication,
        Some(SubIndication::TryLater)
    );
    assert_eq!(selection.verdicts, vec![(TokenId::new("r1"), false)]);

    let mut cache = BlockCache::new();
    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(!report.conclusion.is_passed());
    assert_eq!(report.conclusion.indication, Indication::Indeterminate);
}

/// An OCSP responder certificate carrying id-pkix-ocsp-nocheck needs no
/// revocation evidence of its own: acceptance still passes.
#[test]
fn ocsp_no_check_exempts_the_responder() {
    init_tracing();
    let responder = entity("d", "ta").with_ocsp_no_check();
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
            responder,
        ],
        vec![ocsp("r1", "c", "d", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let verdict = check_revocation_acceptance(
        &diagnostic,
        &TokenId::new("c"),
        &TokenId::new("r1"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();

    assert!(verdict.is_acceptable());
    assert!(verdict
        .conclusion
        .infos
        .iter()
        .any(|m| m.text.contains("id-pkix-ocsp-nocheck")));
}

/// A two-certificate revocation cycle with no independent resolution must
/// terminate and must not conclude PASSED.
#[test]
fn revocation_cycle_terminates_without_passing() {
    init_tracing();
    let diagnostic = DiagnosticData::new(
        vec![
            standalone_cert("a").with_revocation("ra"),
            standalone_cert("b").with_revocation("rb"),
        ],
        vec![crl("ra", "a", "b", 10), crl("rb", "b", "a", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let verdict = check_revocation_acceptance(
        &diagnostic,
        &TokenId::new("a"),
        &TokenId::new("ra"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(!verdict.is_acceptable());
    assert_eq!(
        verdict.conclusion.sub_indication,
        Some(SubIndication::NoRevocationDataForRevocationIssuer)
    );

    let mut cache = BlockCache::new();
    let selection = select_certificate_revocation(
        &diagnostic,
        &TokenId::new("a"),
        SubContext::SigningCert,
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();
    assert!(selection.latest.is_none());
    assert!(!selection.conclusion.is_passed());
}

/// A non-trusted certificate with no issuance chain of its own.
fn standalone_cert(id: &str) -> arbiter_model::Certificate {
    arbiter_model::Certificate::new(id, day(1), day(20)).with_intact_signature()
}

/// A revocation claiming the certificate revoked before the control time
/// is a proven violation: FAILED / REVOKED.
#[test]
fn revoked_certificate_fails() {
    init_tracing();
    let revoked = ocsp("r1", "c", "ta", 10).with_status(CertificateStatus::Revoked {
        revocation_time: day(5),
        reason: Some("keyCompromise".into()),
    });
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
        ],
        vec![revoked],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();

    assert_eq!(report.conclusion.indication, Indication::Failed);
    assert_eq!(report.conclusion.sub_indication, Some(SubIndication::Revoked));
}

/// Without a trust anchor anywhere in the chain, the walk cannot even
/// start revocation work.
#[test]
fn anchorless_chain_is_indeterminate() {
    init_tracing();
    let diagnostic = DiagnosticData::new(vec![standalone_cert("a")], vec![]).unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("a"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();

    assert_eq!(report.conclusion.indication, Indication::Indeterminate);
    assert_eq!(
        report.conclusion.sub_indication,
        Some(SubIndication::NoCertificateChainFound)
    );
    // The walk short-circuits before producing per-certificate reports.
    assert!(report.certificates.is_empty());
}

/// A proof of existence tightens the control time backwards and can turn
/// stale revocation data fresh again.
#[test]
fn poe_tightens_the_control_time() {
    init_tracing();
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
        ],
        vec![ocsp("r1", "c", "ta", 5)], // nextUpdate day 10
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let mut cache = BlockCache::new();

    // Judged at day 12 the token's window has lapsed.
    let stale = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &PoeIndex::new(),
        day(12),
        &mut cache,
    )
    .unwrap();
    assert_eq!(stale.conclusion.sub_indication, Some(SubIndication::TryLater));

    // A proof that the certificate existed on day 9 moves the control time
    // inside the window.
    let poe = PoeIndex::new().with_proof("c", day(9));
    let mut cache = BlockCache::new();
    let fresh = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(12),
        &mut cache,
    )
    .unwrap();
    assert!(fresh.conclusion.is_passed());
}

/// A WARN-level freshness constraint records the problem without flipping
/// the verdict.
#[test]
fn warn_level_staleness_accumulates_without_failing() {
    init_tracing();
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
        ],
        vec![ocsp("r1", "c", "ta", 5)], // nextUpdate day 10
    )
    .unwrap();
    let mut policy = ValidationPolicy::new();
    policy.signing_certificate.revocation_freshness = Constraint::warn();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(12),
        &mut cache,
    )
    .unwrap();

    assert!(report.conclusion.is_passed());
    assert!(report
        .conclusion
        .warnings
        .iter()
        .any(|m| m.check == "revocation_fresh"));
}

/// The conclusion tree serializes for the external report builder.
#[test]
fn report_serializes_for_the_report_builder() {
    init_tracing();
    let diagnostic = DiagnosticData::new(
        vec![
            trust_anchor("ta"),
            entity("c", "ta").with_revocation("r1"),
        ],
        vec![ocsp("r1", "c", "ta", 10)],
    )
    .unwrap();
    let policy = ValidationPolicy::new();
    let poe = PoeIndex::new();
    let mut cache = BlockCache::new();

    let report = validate_certificate_chain(
        &diagnostic,
        &TokenId::new("c"),
        &policy,
        &poe,
        day(10),
        &mut cache,
    )
    .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"PASSED\""));
    let back: arbiter_engine::XcvReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
