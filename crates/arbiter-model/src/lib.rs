//! Fact records and verdict model for the Arbiter validation engine.
//!
//! Everything in this crate is plain data: the certificate/revocation fact
//! graph supplied by an external diagnostic-data builder, the proof-of-
//! existence index supplied by an external timestamp subsystem, and the
//! conclusion model the engine folds its verdicts into. Nothing here
//! performs I/O or cryptography; signature outcomes arrive pre-computed.

pub mod certificate;
pub mod conclusion;
pub mod diagnostic;
pub mod error;
pub mod poe;
pub mod revocation;
pub mod token;

pub use certificate::{Certificate, KeyUsage};
pub use conclusion::{Conclusion, Indication, Message, SubIndication};
pub use diagnostic::DiagnosticData;
pub use error::FactError;
pub use poe::PoeIndex;
pub use revocation::{CertificateStatus, RevocationData, RevocationKind};
pub use token::TokenId;
