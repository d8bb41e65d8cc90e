//! Local and remote party identity: an [`Identity`] holds both private
//! keypairs for the party running this process, while a [`PeerIdentity`]
//! holds only the public material recovered from a verified certificate.

use crate::certificate::Certificate;
use crate::pke::elgamal::{ElGamalKeyPair, ElGamalPublicKey};
use crate::pke::rsa::{RsaKeyPair, RsaPublicKey};

/// A local party: a name plus both private keypairs. Never serialized or
/// sent over the wire as-is — [`Certificate::from_identity`] extracts the
/// public material that is safe to publish.
pub struct Identity {
    pub name: String,
    pub rsa: RsaKeyPair,
    pub elgamal: ElGamalKeyPair,
}

impl Identity {
    /// Generates a fresh identity for `name`, minting both keypairs at
    /// `key_bits` each.
    pub fn generate(name: impl Into<String>, key_bits: u64) -> Self {
        Identity {
            name: name.into(),
            rsa: RsaKeyPair::generate(key_bits),
            elgamal: ElGamalKeyPair::generate(key_bits)
                .expect("generator search budget is generous relative to instructional key sizes"),
        }
    }
}

/// A remote party's public material, recovered from a certificate that
/// verified successfully.
pub struct PeerIdentity {
    pub name: String,
    pub rsa: RsaPublicKey,
    pub elgamal: ElGamalPublicKey,
}

impl PeerIdentity {
    pub fn from_certificate(cert: &Certificate) -> Self {
        PeerIdentity {
            name: cert.name.clone(),
            rsa: RsaPublicKey {
                n: cert.rsa_n.clone(),
                e: cert.rsa_e.clone(),
            },
            elgamal: ElGamalPublicKey {
                p: cert.elgamal_p.clone(),
                g: cert.elgamal_g.clone(),
                h: cert.elgamal_h.clone(),
            },
        }
    }
}
