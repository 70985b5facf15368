use crate::certificate::Certificate;
use crate::error::FactError;
use crate::revocation::RevocationData;
use crate::token::TokenId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The validated fact graph handed to the engine.
///
/// Construction checks referential integrity: every id reachable from a
/// certificate chain, a revocation candidate list, or a signer reference
/// resolves to a record. The engine can therefore look tokens up without
/// ever observing a dangling reference. After construction the graph is
/// read-only; concurrent top-level validations may share it freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticData {
    certificates: BTreeMap<TokenId, Certificate>,
    revocations: BTreeMap<TokenId, RevocationData>,
}

impl DiagnosticData {
    /// Build and validate the fact graph.
    pub fn new(
        certificates: Vec<Certificate>,
        revocations: Vec<RevocationData>,
    ) -> Result<Self, FactError> {
        let mut cert_map = BTreeMap::new();
        for cert in certificates {
            let id = cert.id.clone();
            if cert_map.insert(id.clone(), cert).is_some() {
                return Err(FactError::DuplicateToken { id });
            }
        }
        let mut rev_map = BTreeMap::new();
        for rev in revocations {
            let id = rev.id.clone();
            if rev_map.insert(id.clone(), rev).is_some() {
                return Err(FactError::DuplicateToken { id });
            }
        }

        let data = Self {
            certificates: cert_map,
            revocations: rev_map,
        };
        data.check_references()?;
        Ok(data)
    }

    fn check_references(&self) -> Result<(), FactError> {
        for cert in self.certificates.values() {
            for id in cert.chain.iter().chain(cert.issuer.iter()) {
                if !self.certificates.contains_key(id) {
                    return Err(FactError::UnknownCertificate {
                        id: id.clone(),
                        referenced_by: cert.id.clone(),
                    });
                }
            }
            for id in &cert.revocations {
                match self.revocations.get(id) {
                    None => {
                        return Err(FactError::UnknownRevocation {
                            id: id.clone(),
                            referenced_by: cert.id.clone(),
                        })
                    }
                    Some(rev) if rev.target != cert.id => {
                        return Err(FactError::RevocationTargetMismatch {
                            id: id.clone(),
                            target: rev.target.clone(),
                            listed_by: cert.id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        for rev in self.revocations.values() {
            for id in rev.signer_chain.iter().chain(rev.signer.iter()) {
                if !self.certificates.contains_key(id) {
                    return Err(FactError::UnknownCertificate {
                        id: id.clone(),
                        referenced_by: rev.id.clone(),
                    });
                }
            }
            if !self.certificates.contains_key(&rev.target) {
                return Err(FactError::UnknownCertificate {
                    id: rev.target.clone(),
                    referenced_by: rev.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a certificate.
    pub fn certificate(&self, id: &TokenId) -> Option<&Certificate> {
        self.certificates.get(id)
    }

    /// Look up a revocation token.
    pub fn revocation(&self, id: &TokenId) -> Option<&RevocationData> {
        self.revocations.get(id)
    }

    /// Number of certificates in the graph.
    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    /// Number of revocation tokens in the graph.
    pub fn revocation_count(&self) -> usize {
        self.revocations.len()
    }
}
