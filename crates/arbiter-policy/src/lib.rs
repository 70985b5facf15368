//! Constraint policy for the Arbiter validation engine.
//!
//! A [`ValidationPolicy`] maps every configurable check to a [`Level`] and,
//! where applicable, an accepted-value set. Policies are plain serde
//! documents loaded once per run (typically from YAML) and read-only while
//! the engine executes.
//!
//! # Example
//!
//! ```yaml
//! name: acme-qualified
//! revocation_tie_break: prefer_ocsp
//! signing_certificate:
//!   in_validity_range: { level: fail }
//!   digest_algorithm:
//!     level: fail
//!     accepted_values: [SHA256, SHA384, SHA512]
//!   revocation_max_age_seconds: 86400
//! revocation:
//!   signature_intact: { level: fail }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How strictly a failed check affects the chain verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// The check is not evaluated at all.
    Ignore,
    /// Failure is recorded as an informational message.
    Inform,
    /// Failure is recorded as a warning; the verdict is unaffected.
    Warn,
    /// Failure concludes the chain with the check's failure mapping.
    Fail,
}

/// One configured check: its level plus an optional accepted-value set.
///
/// An empty value set means "no value restriction" — the check's value
/// predicate passes vacuously, mirroring the permissive empty lists of the
/// trust policies this engine's configuration is modeled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub level: Level,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_values: Vec<String>,
}

impl Constraint {
    pub fn fail() -> Self {
        Self {
            level: Level::Fail,
            accepted_values: Vec::new(),
        }
    }

    pub fn warn() -> Self {
        Self {
            level: Level::Warn,
            accepted_values: Vec::new(),
        }
    }

    pub fn inform() -> Self {
        Self {
            level: Level::Inform,
            accepted_values: Vec::new(),
        }
    }

    pub fn ignore() -> Self {
        Self {
            level: Level::Ignore,
            accepted_values: Vec::new(),
        }
    }

    /// Restrict the accepted values.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a value satisfies the accepted set (empty set accepts all).
    pub fn accepts(&self, value: &str) -> bool {
        self.accepted_values.is_empty() || self.accepted_values.iter().any(|v| v == value)
    }
}

/// Resolution rule when two acceptable revocation tokens share the exact
/// same production time. Explicit policy, never incidental iteration order:
/// `KeepFirst` keeps the earlier candidate in the certificate's documented
/// candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationTieBreak {
    #[default]
    KeepFirst,
    PreferOcsp,
    PreferCrl,
}

/// Which position a certificate occupies in the chain under validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubContext {
    /// The end-entity (signing) certificate.
    SigningCert,
    /// A CA certificate, including certificates met while validating
    /// revocation signer chains.
    CaCertificate,
}

/// Per-sub-context constraints applied to one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConstraints {
    /// The certificate's own signature verifies.
    pub signature_intact: Constraint,
    /// The control time falls inside the validity window.
    pub in_validity_range: Constraint,
    /// Required key usages (any of `accepted_values`; empty = no
    /// requirement).
    pub key_usage: Constraint,
    /// Accepted digest algorithms for the certificate signature.
    pub digest_algorithm: Constraint,
    /// Whether revocation data must be checked for this sub-context at
    /// all. `false` models the policy exemption for certificates whose
    /// validity regime makes revocation moot.
    pub require_revocation_data: bool,
    /// At least one revocation token is listed.
    pub revocation_data_available: Constraint,
    /// The selector found an acceptable revocation token.
    pub acceptable_revocation_found: Constraint,
    /// The selected token does not report the certificate revoked.
    pub not_revoked: Constraint,
    /// The selected token does not report the certificate on hold.
    pub not_on_hold: Constraint,
    /// The selected token is fresh enough at the control time.
    pub revocation_freshness: Constraint,
    /// Maximum accepted age of the selected token, in seconds, relative to
    /// the control time. When unset, freshness falls back to the token's
    /// nextUpdate window.
    pub revocation_max_age_seconds: Option<i64>,
}

impl Default for CertificateConstraints {
    fn default() -> Self {
        Self {
            signature_intact: Constraint::fail(),
            in_validity_range: Constraint::fail(),
            key_usage: Constraint::fail(),
            digest_algorithm: Constraint::fail(),
            require_revocation_data: true,
            revocation_data_available: Constraint::fail(),
            acceptable_revocation_found: Constraint::fail(),
            not_revoked: Constraint::fail(),
            not_on_hold: Constraint::fail(),
            revocation_freshness: Constraint::fail(),
            revocation_max_age_seconds: None,
        }
    }
}

/// Constraints applied to a revocation token inside the acceptance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationConstraints {
    /// The token is consistent with the certificate it covers.
    pub consistent: Constraint,
    /// The token's signature verifies.
    pub signature_intact: Constraint,
    /// Accepted digest algorithms for the token signature.
    pub digest_algorithm: Constraint,
    /// The token's signing certificate resolves to a prospective chain.
    pub signer_chain_found: Constraint,
    /// Every non-exempt certificate in the signer chain has acceptable
    /// revocation evidence of its own.
    pub issuer_revocation_found: Constraint,
}

impl Default for RevocationConstraints {
    fn default() -> Self {
        Self {
            consistent: Constraint::fail(),
            signature_intact: Constraint::fail(),
            digest_algorithm: Constraint::fail(),
            signer_chain_found: Constraint::fail(),
            issuer_revocation_found: Constraint::fail(),
        }
    }
}

/// The complete constraint policy for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Display name of the policy.
    pub name: String,
    /// The certificate chain reaches a trust anchor.
    pub prospective_certificate_chain: Constraint,
    /// Constraints for the end-entity certificate.
    pub signing_certificate: CertificateConstraints,
    /// Constraints for CA and revocation-issuer certificates.
    pub ca_certificate: CertificateConstraints,
    /// Constraints for revocation tokens.
    pub revocation: RevocationConstraints,
    /// Tie-break rule for equal production times.
    pub revocation_tie_break: RevocationTieBreak,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            name: "default".into(),
            prospective_certificate_chain: Constraint::fail(),
            signing_certificate: CertificateConstraints::default(),
            ca_certificate: CertificateConstraints::default(),
            revocation: RevocationConstraints::default(),
            revocation_tie_break: RevocationTieBreak::default(),
        }
    }
}

impl ValidationPolicy {
    /// The default policy: every check at FAIL level, no value
    /// restrictions, no explicit freshness window.
    pub fn new() -> Self {
        Self::default()
    }

    /// A permissive policy: every check informs but nothing fails. Useful
    /// for exploratory validation and for exercising message collection.
    pub fn permissive() -> Self {
        fn relax(c: &mut CertificateConstraints) {
            c.signature_intact = Constraint::inform();
            c.in_validity_range = Constraint::inform();
            c.key_usage = Constraint::inform();
            c.digest_algorithm = Constraint::inform();
            c.revocation_data_available = Constraint::inform();
            c.acceptable_revocation_found = Constraint::inform();
            c.not_revoked = Constraint::inform();
            c.not_on_hold = Constraint::inform();
            c.revocation_freshness = Constraint::inform();
        }
        let mut policy = Self {
            name: "permissive".into(),
            prospective_certificate_chain: Constraint::inform(),
            ..Self::default()
        };
        relax(&mut policy.signing_certificate);
        relax(&mut policy.ca_certificate);
        policy.revocation = RevocationConstraints {
            consistent: Constraint::inform(),
            signature_intact: Constraint::inform(),
            digest_algorithm: Constraint::inform(),
            signer_chain_found: Constraint::inform(),
            issuer_revocation_found: Constraint::inform(),
        };
        policy
    }

    /// Constraints for the given sub-context.
    pub fn certificate_constraints(&self, sub_context: SubContext) -> &CertificateConstraints {
        match sub_context {
            SubContext::SigningCert => &self.signing_certificate,
            SubContext::CaCertificate => &self.ca_certificate,
        }
    }

    /// Parse a policy from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse validation policy YAML")
    }

    /// Load a policy from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read validation policy: {}", path.display()))?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_set_accepts_anything() {
        let c = Constraint::fail();
        assert!(c.accepts("SHA1"));

        let c = Constraint::fail().with_values(["SHA256", "SHA512"]);
        assert!(c.accepts("SHA256"));
        assert!(!c.accepts("SHA1"));
    }

    #[test]
    fn test_default_policy_fails_everything() {
        let policy = ValidationPolicy::new();
        assert_eq!(policy.prospective_certificate_chain.level, Level::Fail);
        assert_eq!(policy.signing_certificate.not_revoked.level, Level::Fail);
        assert_eq!(policy.revocation.consistent.level, Level::Fail);
        assert!(policy.signing_certificate.require_revocation_data);
        assert_eq!(policy.revocation_tie_break, RevocationTieBreak::KeepFirst);
    }

    #[test]
    fn test_permissive_policy_never_fails() {
        let policy = ValidationPolicy::permissive();
        assert_eq!(policy.prospective_certificate_chain.level, Level::Inform);
        assert_eq!(policy.signing_certificate.not_revoked.level, Level::Inform);
        assert_eq!(policy.revocation.signature_intact.level, Level::Inform);
    }

    #[test]
    fn test_sub_context_lookup() {
        let mut policy = ValidationPolicy::new();
        policy.ca_certificate.require_revocation_data = false;

        assert!(
            policy
                .certificate_constraints(SubContext::SigningCert)
                .require_revocation_data
        );
        assert!(
            !policy
                .certificate_constraints(SubContext::CaCertificate)
                .require_revocation_data
        );
    }

    #[test]
    fn test_parse_policy_yaml() {
        let yaml = r#"
name: acme
revocation_tie_break: prefer_ocsp
signing_certificate:
  digest_algorithm:
    level: fail
    accepted_values: [SHA256, SHA384]
  revocation_max_age_seconds: 86400
ca_certificate:
  require_revocation_data: false
revocation:
  signature_intact: { level: warn }
"#;
        let policy = ValidationPolicy::from_yaml(yaml).unwrap();
        assert_eq!(policy.name, "acme");
        assert_eq!(policy.revocation_tie_break, RevocationTieBreak::PreferOcsp);
        assert!(policy.signing_certificate.digest_algorithm.accepts("SHA256"));
        assert!(!policy.signing_certificate.digest_algorithm.accepts("SHA1"));
        assert_eq!(
            policy.signing_certificate.revocation_max_age_seconds,
            Some(86400)
        );
        assert!(!policy.ca_certificate.require_revocation_data);
        assert_eq!(policy.revocation.signature_intact.level, Level::Warn);
        // Unspecified checks keep their defaults.
        assert_eq!(policy.revocation.consistent.level, Level::Fail);
    }

    #[test]
    fn test_policy_round_trips_through_file() {
        let policy = ValidationPolicy::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, serde_yaml::to_string(&policy).unwrap()).unwrap();

        let loaded = ValidationPolicy::from_file(&path).unwrap();
        assert_eq!(loaded, policy);
    }

    #[test]
    fn test_missing_policy_file_reports_path() {
        let err = ValidationPolicy::from_file(Path::new("/nonexistent/policy.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policy.yaml"));
    }
}
