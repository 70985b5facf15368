use crate::token::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// X.509 key usage bits relevant to chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUsage {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
    OcspSigning,
}

impl KeyUsage {
    /// Stable name used when matching against policy value sets.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsage::DigitalSignature => "digital_signature",
            KeyUsage::NonRepudiation => "non_repudiation",
            KeyUsage::KeyEncipherment => "key_encipherment",
            KeyUsage::DataEncipherment => "data_encipherment",
            KeyUsage::KeyAgreement => "key_agreement",
            KeyUsage::KeyCertSign => "key_cert_sign",
            KeyUsage::CrlSign => "crl_sign",
            KeyUsage::OcspSigning => "ocsp_signing",
        }
    }
}

/// An immutable certificate fact record.
///
/// All fields are extracted from the X.509 structure (and the trusted-list
/// subsystem) before validation starts. `signature_intact` is the verdict
/// of the external cryptographic verifier for this certificate's own
/// signature; the engine never touches key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Token identifier.
    pub id: TokenId,

    /// Issuer certificate id, when known. Trust anchors and orphans have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<TokenId>,

    /// Start of the validity period (notBefore).
    pub not_before: DateTime<Utc>,

    /// End of the validity period (notAfter).
    pub not_after: DateTime<Utc>,

    /// Whether the trust source accepts this certificate a priori.
    #[serde(default)]
    pub trusted: bool,

    /// Whether the certificate is self-signed.
    #[serde(default)]
    pub self_signed: bool,

    /// Key usage bits asserted by the certificate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_usages: Vec<KeyUsage>,

    /// id-pkix-ocsp-nocheck extension: exempts this certificate (typically
    /// an OCSP responder's) from requiring its own revocation evidence.
    #[serde(default)]
    pub ocsp_no_check: bool,

    /// Verdict of the external cryptographic verifier for this
    /// certificate's signature.
    #[serde(default)]
    pub signature_intact: bool,

    /// Digest algorithm used by the certificate signature, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_algorithm: Option<String>,

    /// Revocation data candidates for this certificate, in the order the
    /// diagnostic data lists them. This order is the documented candidate
    /// order for selection tie-breaks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revocations: Vec<TokenId>,

    /// Issuance chain of this certificate, issuer first, excluding the
    /// certificate itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<TokenId>,
}

impl Certificate {
    /// Create a certificate valid over the given window, with every other
    /// fact unset.
    pub fn new(id: impl Into<TokenId>, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            issuer: None,
            not_before,
            not_after,
            trusted: false,
            self_signed: false,
            key_usages: Vec::new(),
            ocsp_no_check: false,
            signature_intact: false,
            digest_algorithm: None,
            revocations: Vec::new(),
            chain: Vec::new(),
        }
    }

    /// Mark the certificate as a trust anchor.
    pub fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    /// Mark the certificate as self-signed.
    pub fn self_signed(mut self) -> Self {
        self.self_signed = true;
        self
    }

    /// Mark the certificate signature as cryptographically intact.
    pub fn with_intact_signature(mut self) -> Self {
        self.signature_intact = true;
        self
    }

    /// Set the issuer id.
    pub fn with_issuer(mut self, issuer: impl Into<TokenId>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the digest algorithm of the certificate signature.
    pub fn with_digest_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.digest_algorithm = Some(algorithm.into());
        self
    }

    /// Add a key usage bit.
    pub fn with_key_usage(mut self, usage: KeyUsage) -> Self {
        self.key_usages.push(usage);
        self
    }

    /// Set the id-pkix-ocsp-nocheck flag.
    pub fn with_ocsp_no_check(mut self) -> Self {
        self.ocsp_no_check = true;
        self
    }

    /// Append a revocation data candidate id.
    pub fn with_revocation(mut self, id: impl Into<TokenId>) -> Self {
        self.revocations.push(id.into());
        self
    }

    /// Set the issuance chain (issuer first).
    pub fn with_chain(mut self, chain: Vec<TokenId>) -> Self {
        self.chain = chain;
        self
    }

    /// Whether the validity window contains the given instant.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// Whether the certificate asserts the given key usage.
    pub fn has_key_usage(&self, usage: KeyUsage) -> bool {
        self.key_usages.contains(&usage)
    }
}
