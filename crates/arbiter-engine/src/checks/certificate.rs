use crate::chain::{Check, CheckKind};
use arbiter_model::{Certificate, CertificateStatus, RevocationData};
use arbiter_policy::Constraint;
use chrono::{DateTime, Duration, Utc};

pub(crate) fn signature_valid(cert: &Certificate) -> Check {
    let check = Check::new(CheckKind::CertificateSignatureValid, cert.signature_intact);
    if cert.signature_intact {
        check
    } else {
        check.with_detail(format!("certificate {}", cert.id))
    }
}

pub(crate) fn validity_range(cert: &Certificate, control_time: DateTime<Utc>) -> Check {
    let check = Check::new(CheckKind::CertificateInValidityRange, cert.is_valid_at(control_time));
    if cert.is_valid_at(control_time) {
        check
    } else {
        check.with_detail(format!(
            "certificate {} valid {} to {}, control time {}",
            cert.id, cert.not_before, cert.not_after, control_time
        ))
    }
}

/// Passes when the policy requires no usage, or when the certificate
/// carries at least one of the accepted usages.
pub(crate) fn key_usage(cert: &Certificate, constraint: &Constraint) -> Check {
    let passed = constraint.accepted_values.is_empty()
        || cert.key_usages.iter().any(|u| constraint.accepts(u.as_str()));
    let check = Check::new(CheckKind::CertificateKeyUsage, passed);
    if passed {
        check
    } else {
        let present: Vec<&str> = cert.key_usages.iter().map(|u| u.as_str()).collect();
        check.with_detail(format!(
            "certificate {} carries [{}], accepted [{}]",
            cert.id,
            present.join(", "),
            constraint.accepted_values.join(", ")
        ))
    }
}

pub(crate) fn digest_algorithm(cert: &Certificate, constraint: &Constraint) -> Check {
    digest_accepted(
        CheckKind::CertificateDigestAlgorithmAccepted,
        cert.digest_algorithm.as_deref(),
        constraint,
        &format!("certificate {}", cert.id),
    )
}

pub(crate) fn revocation_data_available(cert: &Certificate) -> Check {
    let check = Check::new(CheckKind::RevocationDataAvailable, !cert.revocations.is_empty());
    if cert.revocations.is_empty() {
        check.with_detail(format!("certificate {}", cert.id))
    } else {
        check
    }
}

/// A revocation claim only counts against the certificate once its
/// revocation time is at or before the control time; a revocation in the
/// control time's future proves nothing about the instant under judgment.
pub(crate) fn not_revoked(revocation: &RevocationData, control_time: DateTime<Utc>) -> Check {
    match &revocation.status {
        CertificateStatus::Revoked {
            revocation_time,
            reason,
        } if *revocation_time <= control_time => {
            Check::new(CheckKind::CertificateNotRevoked, false).with_detail(format!(
                "revoked at {}{}",
                revocation_time,
                reason
                    .as_deref()
                    .map(|r| format!(", reason {r}"))
                    .unwrap_or_default()
            ))
        }
        _ => Check::new(CheckKind::CertificateNotRevoked, true),
    }
}

pub(crate) fn not_on_hold(revocation: &RevocationData, control_time: DateTime<Utc>) -> Check {
    match &revocation.status {
        CertificateStatus::OnHold { hold_time } if *hold_time <= control_time => {
            Check::new(CheckKind::CertificateNotOnHold, false)
                .with_detail(format!("on hold since {hold_time}"))
        }
        _ => Check::new(CheckKind::CertificateNotOnHold, true),
    }
}

/// Freshness of the selected revocation token at the control time: within
/// the configured maximum age when one is set, otherwise inside the
/// token's announced nextUpdate window.
pub(crate) fn revocation_fresh(
    revocation: &RevocationData,
    control_time: DateTime<Utc>,
    max_age_seconds: Option<i64>,
) -> Check {
    match max_age_seconds {
        Some(seconds) => {
            let age = control_time - revocation.production_time;
            let passed = age <= Duration::seconds(seconds);
            let check = Check::new(CheckKind::RevocationFresh, passed);
            if passed {
                check
            } else {
                check.with_detail(format!(
                    "produced at {}, {}s old at control time, maximum {}s",
                    revocation.production_time,
                    age.num_seconds(),
                    seconds
                ))
            }
        }
        None => match revocation.next_update {
            Some(next_update) => {
                let passed = next_update >= control_time;
                let check = Check::new(CheckKind::RevocationFresh, passed);
                if passed {
                    check
                } else {
                    check.with_detail(format!(
                        "nextUpdate {} is before control time {}",
                        next_update, control_time
                    ))
                }
            }
            // No freshness requirement is configured and the issuer
            // announced no update interval.
            None => Check::new(CheckKind::RevocationFresh, true),
        },
    }
}

pub(crate) fn digest_accepted(
    kind: CheckKind,
    algorithm: Option<&str>,
    constraint: &Constraint,
    token: &str,
) -> Check {
    if constraint.accepted_values.is_empty() {
        return Check::new(kind, true);
    }
    match algorithm {
        Some(algorithm) if constraint.accepts(algorithm) => Check::new(kind, true),
        Some(algorithm) => Check::new(kind, false).with_detail(format!(
            "{token} uses {algorithm}, accepted [{}]",
            constraint.accepted_values.join(", ")
        )),
        None => Check::new(kind, false).with_detail(format!("{token} digest algorithm unknown")),
    }
}
