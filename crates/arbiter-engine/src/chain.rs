//! Ordered-rule evaluation: chains of checks with short-circuit semantics.
//!
//! A [`Chain`] folds a sequence of evaluated [`Check`]s into one
//! [`Conclusion`]. The first FAIL-level failure concludes the chain with
//! the check's declared failure mapping; WARN and INFORM failures only
//! collect messages. The failure mapping and message text are static data
//! on [`CheckKind`], not behavior.

use arbiter_model::{Conclusion, Indication, Message, SubIndication};
use arbiter_policy::Level;

/// Every check the engine can evaluate. Closed set: the failure mapping
/// (Indication, SubIndication) of each kind is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    // Chain-level
    ProspectiveCertificateChain,
    // Per-certificate
    CertificateSignatureValid,
    CertificateInValidityRange,
    CertificateKeyUsage,
    CertificateDigestAlgorithmAccepted,
    RevocationDataAvailable,
    AcceptableRevocationFound,
    CertificateNotRevoked,
    CertificateNotOnHold,
    RevocationFresh,
    // Revocation acceptance
    RevocationConsistent,
    RevocationSignatureValid,
    RevocationDigestAlgorithmAccepted,
    RevocationSignerChainFound,
    RevocationIssuerSignatureValid,
    RevocationIssuerRevocationFound,
}

impl CheckKind {
    /// Stable check name used to tag messages.
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::ProspectiveCertificateChain => "prospective_certificate_chain",
            CheckKind::CertificateSignatureValid => "certificate_signature_valid",
            CheckKind::CertificateInValidityRange => "certificate_in_validity_range",
            CheckKind::CertificateKeyUsage => "certificate_key_usage",
            CheckKind::CertificateDigestAlgorithmAccepted => "certificate_digest_algorithm_accepted",
            CheckKind::RevocationDataAvailable => "revocation_data_available",
            CheckKind::AcceptableRevocationFound => "acceptable_revocation_found",
            CheckKind::CertificateNotRevoked => "certificate_not_revoked",
            CheckKind::CertificateNotOnHold => "certificate_not_on_hold",
            CheckKind::RevocationFresh => "revocation_fresh",
            CheckKind::RevocationConsistent => "revocation_consistent",
            CheckKind::RevocationSignatureValid => "revocation_signature_valid",
            CheckKind::RevocationDigestAlgorithmAccepted => "revocation_digest_algorithm_accepted",
            CheckKind::RevocationSignerChainFound => "revocation_signer_chain_found",
            CheckKind::RevocationIssuerSignatureValid => "revocation_issuer_signature_valid",
            CheckKind::RevocationIssuerRevocationFound => "revocation_issuer_revocation_found",
        }
    }

    /// Message recorded when the check fails.
    pub fn error_message(&self) -> &'static str {
        match self {
            CheckKind::ProspectiveCertificateChain => {
                "the certificate chain does not reach a trust anchor"
            }
            CheckKind::CertificateSignatureValid => "the certificate signature is not intact",
            CheckKind::CertificateInValidityRange => {
                "the control time is outside the certificate validity range"
            }
            CheckKind::CertificateKeyUsage => {
                "the certificate does not carry a required key usage"
            }
            CheckKind::CertificateDigestAlgorithmAccepted => {
                "the certificate digest algorithm is not accepted"
            }
            CheckKind::RevocationDataAvailable => "no revocation data is available",
            CheckKind::AcceptableRevocationFound => "no acceptable revocation data is available",
            CheckKind::CertificateNotRevoked => "the certificate is revoked",
            CheckKind::CertificateNotOnHold => "the certificate is on hold",
            CheckKind::RevocationFresh => "the selected revocation data is not fresh",
            CheckKind::RevocationConsistent => {
                "the revocation data is not consistent with the certificate"
            }
            CheckKind::RevocationSignatureValid => "the revocation signature is not intact",
            CheckKind::RevocationDigestAlgorithmAccepted => {
                "the revocation digest algorithm is not accepted"
            }
            CheckKind::RevocationSignerChainFound => {
                "no prospective certificate chain for the revocation signer"
            }
            CheckKind::RevocationIssuerSignatureValid => {
                "the signature of a revocation issuer certificate is not intact"
            }
            CheckKind::RevocationIssuerRevocationFound => {
                "no acceptable revocation data for an issuer of the revocation data"
            }
        }
    }

    /// Verdict a FAIL-level failure of this check concludes the chain with.
    pub fn failure(&self) -> (Indication, SubIndication) {
        match self {
            CheckKind::ProspectiveCertificateChain => {
                (Indication::Indeterminate, SubIndication::NoCertificateChainFound)
            }
            CheckKind::CertificateSignatureValid => (
                Indication::Indeterminate,
                SubIndication::CertificateChainGeneralFailure,
            ),
            CheckKind::CertificateInValidityRange => {
                (Indication::Indeterminate, SubIndication::OutOfBoundsNoPoe)
            }
            CheckKind::CertificateKeyUsage => (
                Indication::Indeterminate,
                SubIndication::CertificateChainGeneralFailure,
            ),
            CheckKind::CertificateDigestAlgorithmAccepted => (
                Indication::Indeterminate,
                SubIndication::CryptoConstraintsFailure,
            ),
            CheckKind::RevocationDataAvailable => {
                (Indication::Indeterminate, SubIndication::TryLater)
            }
            CheckKind::AcceptableRevocationFound => {
                (Indication::Indeterminate, SubIndication::TryLater)
            }
            CheckKind::CertificateNotRevoked => (Indication::Failed, SubIndication::Revoked),
            CheckKind::CertificateNotOnHold => (Indication::Indeterminate, SubIndication::TryLater),
            CheckKind::RevocationFresh => (Indication::Indeterminate, SubIndication::TryLater),
            CheckKind::RevocationConsistent => (
                Indication::Indeterminate,
                SubIndication::CertificateChainGeneralFailure,
            ),
            CheckKind::RevocationSignatureValid => (
                Indication::Indeterminate,
                SubIndication::CertificateChainGeneralFailure,
            ),
            CheckKind::RevocationDigestAlgorithmAccepted => (
                Indication::Indeterminate,
                SubIndication::CryptoConstraintsFailure,
            ),
            CheckKind::RevocationSignerChainFound => {
                (Indication::Indeterminate, SubIndication::NoCertificateChainFound)
            }
            CheckKind::RevocationIssuerSignatureValid => (
                Indication::Indeterminate,
                SubIndication::CertificateChainGeneralFailure,
            ),
            CheckKind::RevocationIssuerRevocationFound => (
                Indication::Indeterminate,
                SubIndication::NoRevocationDataForRevocationIssuer,
            ),
        }
    }
}

/// An evaluated check: its kind, the predicate outcome, and optional
/// detail text carried into the recorded message.
#[derive(Debug, Clone)]
pub struct Check {
    kind: CheckKind,
    passed: bool,
    detail: Option<String>,
}

impl Check {
    pub fn new(kind: CheckKind, passed: bool) -> Self {
        Self {
            kind,
            passed,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> CheckKind {
        self.kind
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// Sequential chain evaluator. Create one per block, feed it checks in
/// order, then take the [`Conclusion`].
#[derive(Debug)]
pub struct Chain {
    title: &'static str,
    concluded: bool,
    indication: Indication,
    sub_indication: Option<SubIndication>,
    errors: Vec<Message>,
    warnings: Vec<Message>,
    infos: Vec<Message>,
}

impl Chain {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            concluded: false,
            indication: Indication::Passed,
            sub_indication: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    /// Title of the block this chain evaluates.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Whether a FAIL-level failure already concluded this chain. Callers
    /// use this to skip building further FAIL-level checks, in particular
    /// the recursive ones.
    pub fn concluded(&self) -> bool {
        self.concluded
    }

    /// Fold one evaluated check at the given level.
    pub fn execute(&mut self, level: Level, check: Check) {
        let kind = check.kind();
        match level {
            Level::Ignore => {}
            _ if check.passed() => {
                if let Some(detail) = check.detail {
                    self.infos.push(Message::new(kind.name(), detail));
                }
            }
            Level::Fail => {
                // The first FAIL-level failure wins; later ones neither
                // override the verdict nor add noise.
                if !self.concluded {
                    self.errors.push(Message::new(kind.name(), failure_text(&check)));
                    let (indication, sub_indication) = kind.failure();
                    self.indication = indication;
                    self.sub_indication = Some(sub_indication);
                    self.concluded = true;
                }
            }
            Level::Warn => {
                self.warnings.push(Message::new(kind.name(), failure_text(&check)));
            }
            Level::Inform => {
                self.infos.push(Message::new(kind.name(), failure_text(&check)));
            }
        }
    }

    /// Record an informational note attributed to a check, outside any
    /// pass/fail evaluation (visited-token skips, exemptions).
    pub fn note(&mut self, kind: CheckKind, text: impl Into<String>) {
        self.infos.push(Message::new(kind.name(), text));
    }

    /// Fold a sub-block conclusion into this chain: warnings always
    /// accumulate; a non-passed sub-block concludes this chain (first
    /// failure wins) adopting its indication and reason code.
    pub fn absorb(&mut self, block: &str, sub: &Conclusion) {
        self.warnings.extend(sub.warnings.iter().cloned());
        if sub.is_passed() || self.concluded {
            return;
        }
        if sub.errors.is_empty() {
            self.errors.push(Message::new(block, "sub-block did not conclude PASSED"));
        } else {
            self.errors.extend(sub.errors.iter().cloned());
        }
        self.indication = sub.indication;
        self.sub_indication = sub.sub_indication;
        self.concluded = true;
    }

    /// Finish the chain. Completing without a FAIL-level failure is PASSED.
    pub fn conclude(self) -> Conclusion {
        Conclusion {
            indication: self.indication,
            sub_indication: self.sub_indication,
            errors: self.errors,
            warnings: self.warnings,
            infos: self.infos,
        }
    }
}

fn failure_text(check: &Check) -> String {
    match &check.detail {
        Some(detail) => format!("{} ({})", check.kind().error_message(), detail),
        None => check.kind().error_message().to_string(),
    }
}
