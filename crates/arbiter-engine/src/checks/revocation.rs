use crate::chain::{Check, CheckKind};
use crate::checks::certificate::digest_accepted;
use arbiter_model::{Certificate, DiagnosticData, RevocationData, RevocationKind};
use arbiter_policy::Constraint;

/// Consistency of one revocation token with the certificate it covers.
///
/// The accepted window `notAfterRevoc` starts at thisUpdate and is
/// tightened by the expiredCertsOnCRL (CRL) or ArchiveCutoff (OCSP)
/// extension when that lies earlier; a matching certHash also proves the
/// issuer knows the certificate. For OCSP the token must additionally be
/// produced inside the responder certificate's own validity window.
pub(crate) fn consistent(
    diagnostic: &DiagnosticData,
    cert: &Certificate,
    revocation: &RevocationData,
) -> Check {
    let kind = CheckKind::RevocationConsistent;

    let Some(this_update) = revocation.this_update else {
        return Check::new(kind, false).with_detail("thisUpdate is not defined");
    };

    if revocation.production_time < cert.not_before {
        return Check::new(kind, false).with_detail(format!(
            "produced at {} before certificate notBefore {}",
            revocation.production_time, cert.not_before
        ));
    }

    if cert.not_before > this_update {
        return Check::new(kind, false).with_detail(format!(
            "thisUpdate {} is before certificate notBefore {}",
            this_update, cert.not_before
        ));
    }

    let mut not_after_revoc = this_update;
    if let Some(expired_certs_on_crl) = revocation.expired_certs_on_crl {
        if expired_certs_on_crl < not_after_revoc {
            not_after_revoc = expired_certs_on_crl;
        }
    }
    if let Some(archive_cut_off) = revocation.archive_cut_off {
        if archive_cut_off < not_after_revoc {
            not_after_revoc = archive_cut_off;
        }
    }
    let cert_hash_ok = revocation.cert_hash_present && revocation.cert_hash_match;
    if cert.not_after < not_after_revoc && !cert_hash_ok {
        return Check::new(kind, false).with_detail(format!(
            "issuer has no information about the certificate after {} (notAfter {})",
            not_after_revoc, cert.not_after
        ));
    }

    let Some(signer) = &revocation.signer else {
        return Check::new(kind, false).with_detail("the revocation issuer is unknown");
    };

    if revocation.kind == RevocationKind::Ocsp {
        if let Some(responder) = diagnostic.certificate(signer) {
            if !responder.is_valid_at(revocation.production_time) {
                return Check::new(kind, false).with_detail(format!(
                    "produced at {} outside responder certificate validity {} to {}",
                    revocation.production_time, responder.not_before, responder.not_after
                ));
            }
        }
    }

    Check::new(kind, true)
}

pub(crate) fn signature_intact(revocation: &RevocationData) -> Check {
    let check = Check::new(CheckKind::RevocationSignatureValid, revocation.signature_intact);
    if revocation.signature_intact {
        check
    } else {
        check.with_detail(format!("revocation {}", revocation.id))
    }
}

pub(crate) fn digest_algorithm(revocation: &RevocationData, constraint: &Constraint) -> Check {
    digest_accepted(
        CheckKind::RevocationDigestAlgorithmAccepted,
        revocation.digest_algorithm.as_deref(),
        constraint,
        &format!("revocation {}", revocation.id),
    )
}

/// The signing certificate must resolve to a prospective chain: some
/// certificate, trusted or not.
pub(crate) fn signer_chain_found(diagnostic: &DiagnosticData, revocation: &RevocationData) -> Check {
    let found = revocation
        .signer
        .as_ref()
        .is_some_and(|signer| diagnostic.certificate(signer).is_some());
    let check = Check::new(CheckKind::RevocationSignerChainFound, found);
    if found {
        check
    } else {
        check.with_detail(format!("revocation {}", revocation.id))
    }
}

pub(crate) fn issuer_signature_valid(issuer: &Certificate) -> Check {
    let check = Check::new(CheckKind::RevocationIssuerSignatureValid, issuer.signature_intact);
    if issuer.signature_intact {
        check
    } else {
        check.with_detail(format!("certificate {}", issuer.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_model::TokenId;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    fn graph() -> DiagnosticData {
        DiagnosticData::new(
            vec![
                Certificate::new("ee", at(1), at(20)).with_revocation("r1"),
                Certificate::new("resp", at(5), at(15)),
            ],
            vec![RevocationData::new("r1", RevocationKind::Ocsp, "ee", at(10))
                .with_signer("resp", vec![])],
        )
        .unwrap()
    }

    fn lookup<'a>(d: &'a DiagnosticData, id: &str) -> (&'a Certificate, &'a RevocationData) {
        (
            d.certificate(&TokenId::new(id)).unwrap(),
            d.revocation(&TokenId::new("r1")).unwrap(),
        )
    }

    #[test]
    fn test_consistent_token_passes() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        assert!(consistent(&d, cert, rev).passed());
    }

    #[test]
    fn test_missing_this_update_is_inconsistent() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        let rev = rev.clone().with_this_update(None);
        assert!(!consistent(&d, cert, &rev).passed());
    }

    #[test]
    fn test_this_update_before_not_before_is_inconsistent() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        let mut rev = rev.clone();
        rev.production_time = at(2);
        rev = rev.with_this_update(Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()));
        assert!(!consistent(&d, cert, &rev).passed());
    }

    #[test]
    fn test_missing_signer_is_inconsistent() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        let mut rev = rev.clone();
        rev.signer = None;
        assert!(!consistent(&d, cert, &rev).passed());
    }

    #[test]
    fn test_ocsp_produced_outside_responder_window_is_inconsistent() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        let mut rev = rev.clone();
        // Responder is valid days 5..15; production at day 18 is outside.
        rev.production_time = at(18);
        rev = rev.with_this_update(Some(at(18)));
        assert!(!consistent(&d, cert, &rev).passed());
    }

    #[test]
    fn test_expired_certificate_with_matching_cert_hash_is_consistent() {
        let d = graph();
        let (cert, rev) = lookup(&d, "ee");
        let mut cert = cert.clone();
        // Window computed from thisUpdate would exclude the certificate,
        // but a matching certHash proves the issuer knows it.
        cert.not_after = at(5);
        let mut rev = rev.clone();
        rev.cert_hash_present = true;
        rev.cert_hash_match = true;
        assert!(consistent(&d, &cert, &rev).passed());

        rev.cert_hash_match = false;
        assert!(!consistent(&d, &cert, &rev).passed());
    }

    #[test]
    fn test_signer_chain_found_requires_signer() {
        let d = graph();
        let (_, rev) = lookup(&d, "ee");
        assert!(signer_chain_found(&d, rev).passed());

        let mut orphan = rev.clone();
        orphan.signer = None;
        assert!(!signer_chain_found(&d, &orphan).passed());
    }
}
