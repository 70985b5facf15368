//! Shared fixtures: a small PKI with a trust anchor, an end-entity and
//! revocation tokens, built the way the diagnostic-data collaborator
//! would supply them.

use arbiter_model::{Certificate, RevocationData, RevocationKind, TokenId};
use chrono::{DateTime, TimeZone, Utc};

/// Noon UTC on the given day of June 2025.
pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap()
}

/// A self-signed trust anchor valid over the whole test window.
pub fn trust_anchor(id: &str) -> Certificate {
    Certificate::new(id, day(1), day(30))
        .trusted()
        .self_signed()
        .with_intact_signature()
}

/// A non-trusted certificate valid days 1..20 with an intact signature,
/// chained to the given anchor.
pub fn entity(id: &str, anchor: &str) -> Certificate {
    Certificate::new(id, day(1), day(20))
        .with_issuer(anchor)
        .with_intact_signature()
        .with_chain(vec![TokenId::new(anchor)])
}

/// An intact OCSP token for `target`, produced on the given day, signed by
/// `signer`, announcing a nextUpdate five days later.
pub fn ocsp(id: &str, target: &str, signer: &str, produced: u32) -> RevocationData {
    RevocationData::new(id, RevocationKind::Ocsp, target, day(produced))
        .with_signer(signer, vec![])
        .with_intact_signature()
        .with_next_update(day(produced + 5))
}

/// Same shape as [`ocsp`], as a CRL.
pub fn crl(id: &str, target: &str, signer: &str, produced: u32) -> RevocationData {
    RevocationData::new(id, RevocationKind::Crl, target, day(produced))
        .with_signer(signer, vec![])
        .with_intact_signature()
        .with_next_update(day(produced + 5))
}

/// Route test logs through tracing when RUST_LOG asks for them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
