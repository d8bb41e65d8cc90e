//! Self-signed certificates exchanged during the handshake.
//!
//! A certificate carries one party's name and both public keys, signed with
//! that same party's own ElGamal private key over a SHA-256 hash of the
//! whole payload. There is no certificate authority: each party vouches for
//! itself, and the handshake accepts a peer only if its certificate's
//! self-signature verifies.

use std::io::{Read, Write};

use num_bigint::BigUint;

use crate::bigint;
use crate::digest;
use crate::error::CertificateError;
use crate::framing;
use crate::identity::Identity;

/// The fixed role marker every certificate carries.
const ISSUER: &str = "Admin";

/// A signed, self-contained statement of one party's identity and public
/// keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub hash_hex: String,
    pub name: String,
    pub issuer: String,
    pub rsa_n: BigUint,
    pub rsa_e: BigUint,
    pub elgamal_p: BigUint,
    pub elgamal_g: BigUint,
    pub elgamal_h: BigUint,
    pub signature_r: BigUint,
    pub signature_s: BigUint,
}

impl Certificate {
    /// Builds and self-signs a certificate for `identity`.
    pub fn from_identity(identity: &Identity) -> Self {
        let rsa_pub = identity.rsa.public();
        let elgamal_pub = identity.elgamal.public();

        let preimage = signature_preimage(
            &identity.name,
            ISSUER,
            &rsa_pub.e,
            &rsa_pub.n,
            &elgamal_pub.p,
            &elgamal_pub.g,
            &elgamal_pub.h,
        );
        let hash_hex = digest::digest_hex(preimage.as_bytes());
        let (r, s) = identity.elgamal.sign_hash(hash_hex.as_bytes());

        Certificate {
            hash_hex,
            name: identity.name.clone(),
            issuer: ISSUER.to_string(),
            rsa_n: rsa_pub.n,
            rsa_e: rsa_pub.e,
            elgamal_p: elgamal_pub.p,
            elgamal_g: elgamal_pub.g,
            elgamal_h: elgamal_pub.h,
            signature_r: r,
            signature_s: s,
        }
    }

    /// Verifies the self-signature against this certificate's own ElGamal
    /// public key.
    pub fn verify(&self) -> bool {
        let pk = crate::pke::elgamal::ElGamalPublicKey {
            p: self.elgamal_p.clone(),
            g: self.elgamal_g.clone(),
            h: self.elgamal_h.clone(),
        };
        pk.verify_hash(self.hash_hex.as_bytes(), &(self.signature_r.clone(), self.signature_s.clone()))
    }

    /// Writes this certificate as a single length-prefixed frame, itself
    /// containing one length-prefixed sub-frame per field.
    pub fn send<W: Write>(&self, stream: &mut W) -> Result<(), CertificateError> {
        let mut payload = Vec::new();
        write_sub_frame(&mut payload, self.hash_hex.as_bytes());
        write_sub_frame(&mut payload, self.name.as_bytes());
        write_sub_frame(&mut payload, self.issuer.as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.rsa_e).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.rsa_n).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.elgamal_p).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.elgamal_g).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.elgamal_h).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.signature_r).as_bytes());
        write_sub_frame(&mut payload, bigint::to_decimal(&self.signature_s).as_bytes());
        framing::write_frame(stream, &payload).map_err(CertificateError::Malformed)
    }

    /// Reads a certificate previously written with [`Certificate::send`].
    pub fn receive<R: Read>(stream: &mut R) -> Result<Self, CertificateError> {
        let payload = framing::read_frame(stream).map_err(CertificateError::Malformed)?;
        let mut cursor = std::io::Cursor::new(payload);

        let hash_hex = framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?;
        let name = framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?;
        let issuer = framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?;
        let rsa_e = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let rsa_n = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let elgamal_p = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let elgamal_g = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let elgamal_h = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let signature_r = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;
        let signature_s = bigint::parse_decimal(&framing::read_string_frame(&mut cursor).map_err(CertificateError::Malformed)?)
            .map_err(CertificateError::Malformed)?;

        Ok(Certificate {
            hash_hex,
            name,
            issuer,
            rsa_n,
            rsa_e,
            elgamal_p,
            elgamal_g,
            elgamal_h,
            signature_r,
            signature_s,
        })
    }
}

fn write_sub_frame(buf: &mut Vec<u8>, payload: &[u8]) {
    framing::write_frame(buf, payload).expect("writing to an in-memory Vec never fails");
}

/// Builds the byte string hashed and signed over a certificate: the party's
/// name, the issuer role marker, the RSA block `"e n "`, a second space, and
/// the ElGamal block `"p g h "` — each BigInt rendered as decimal followed
/// by one ASCII space.
fn signature_preimage(
    name: &str,
    issuer: &str,
    rsa_e: &BigUint,
    rsa_n: &BigUint,
    elgamal_p: &BigUint,
    elgamal_g: &BigUint,
    elgamal_h: &BigUint,
) -> String {
    format!(
        "{name}{issuer}{e} {n}  {p} {g} {h} ",
        name = name,
        issuer = issuer,
        e = bigint::to_decimal(rsa_e),
        n = bigint::to_decimal(rsa_n),
        p = bigint::to_decimal(elgamal_p),
        g = bigint::to_decimal(elgamal_g),
        h = bigint::to_decimal(elgamal_h),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn self_signed_certificate_verifies() {
        let identity = Identity::generate("alice", 64);
        let cert = Certificate::from_identity(&identity);
        assert!(cert.verify());
    }

    #[test]
    fn tampered_certificate_fails_verification() {
        let identity = Identity::generate("alice", 64);
        let mut cert = Certificate::from_identity(&identity);
        cert.name = "mallory".to_string();
        assert!(!cert.verify());
    }

    #[test]
    fn tampered_hash_fails_verification() {
        let identity = Identity::generate("alice", 64);
        let mut cert = Certificate::from_identity(&identity);
        cert.hash_hex = "0".repeat(64);
        assert!(!cert.verify());
    }

    #[test]
    fn round_trips_over_a_stream() {
        let identity = Identity::generate("bob", 64);
        let cert = Certificate::from_identity(&identity);

        let mut buf = Vec::new();
        cert.send(&mut buf).unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let recovered = Certificate::receive(&mut cursor).unwrap();

        assert_eq!(recovered, cert);
        assert!(recovered.verify());
    }

    #[test]
    fn preimage_has_two_spaces_between_rsa_and_elgamal_blocks() {
        let one = BigUint::from(1u32);
        let preimage = signature_preimage("n", "Admin", &one, &one, &one, &one, &one);
        assert!(preimage.contains("1  1"));
    }
}
