//! A textbook RSA variant: key generation, raw integer encrypt/decrypt,
//! byte-wise message encrypt/decrypt, and a weighted-sum hash-and-sign scheme
//! used for certificate self-signatures.
//!
//! ## Algorithm: key generation
//! Draw two primes `p`, `q` of `bits / 2` bits each, set `n = p * q` and
//! `phi = (p - 1) * (q - 1)`. Starting from `e = 65537`, increment by 2 until
//! `gcd(e, phi) == 1`. Compute `d = e^-1 mod phi`.
//!
//! ## Algorithm: encrypt/decrypt
//! `c = m^e mod n`, `m = c^d mod n`. Byte-wise variants apply this one byte
//! (as an integer in `[0, 256)`) at a time, which keeps every intermediate
//! message strictly smaller than `n` at the instructional key sizes this
//! crate targets.
//!
//! ## Algorithm: hash-and-sign
//! The "hash" is a base-256 Horner reduction of message bytes mod `n`
//! (`hash_to_int`), not a cryptographic digest — this mirrors the scheme's
//! own `hashFunction`, kept deliberately non-cryptographic to match. Signing
//! and verification are the RSA permutation and its inverse applied to that
//! integer.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use rayon::prelude::*;

use crate::bigint;
use crate::error::PkeError;

/// The public half of an RSA-style keypair: a modulus and a public exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// A full RSA-style keypair. [`RsaKeyPair::public`] extracts the half that is
/// safe to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
}

impl RsaKeyPair {
    /// Generates a fresh keypair with a modulus of approximately `bits` bits
    /// (`bits / 2` bits per prime factor).
    pub fn generate(bits: u64) -> Self {
        let half = bits / 2;
        loop {
            let p = bigint::gen_prime(half);
            let q = bigint::gen_prime(half);
            if p == q {
                continue;
            }
            let n = &p * &q;
            let one = BigUint::one();
            let phi = (&p - &one) * (&q - &one);

            let mut e = BigUint::from(65537u32);
            while bigint::gcd(&e, &phi) != one {
                e += BigUint::from(2u32);
            }

            if let Some(d) = bigint::inv_mod(&e, &phi) {
                return RsaKeyPair { n, e, d };
            }
        }
    }

    pub fn public(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    /// `m^d mod n`.
    pub fn decrypt_int(&self, ciphertext: &BigUint) -> BigUint {
        bigint::power_mod(ciphertext, &self.d, &self.n)
    }

    /// Decrypts a sequence of space-separated decimal integers, one per byte.
    pub fn decrypt_bytes(&self, ciphertext: &str) -> Result<Vec<u8>, PkeError> {
        ciphertext
            .split_whitespace()
            .map(|token| {
                let c = bigint::parse_decimal(token)
                    .map_err(|_| PkeError::ByteOutOfRange(token.to_string()))?;
                let m = self.decrypt_int(&c);
                m.to_u8()
                    .ok_or_else(|| PkeError::ByteOutOfRange(bigint::to_decimal(&m)))
            })
            .collect()
    }

    /// `h^d mod n` — the RSA permutation used as the signing primitive.
    pub fn sign_int(&self, hash: &BigUint) -> BigUint {
        bigint::power_mod(hash, &self.d, &self.n)
    }

    /// Computes [`hash_to_int`] for `message` and signs it.
    pub fn sign_hash(&self, message: &[u8]) -> BigUint {
        self.sign_int(&hash_to_int(message, &self.n))
    }
}

impl RsaPublicKey {
    /// `m^e mod n`. Returns an error if `message >= n`, since the
    /// byte-at-a-time framing above guarantees this never legitimately
    /// happens and a caller hitting it has passed an oversized value.
    pub fn encrypt_int(&self, message: &BigUint) -> Result<BigUint, PkeError> {
        if message >= &self.n {
            return Err(PkeError::MessageTooLarge(bigint::to_decimal(message)));
        }
        Ok(bigint::power_mod(message, &self.e, &self.n))
    }

    /// Encrypts `plaintext` one byte at a time, rendering the result as
    /// space-separated decimal integers.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String, PkeError> {
        let tokens: Result<Vec<String>, PkeError> = plaintext
            .par_iter()
            .map(|&byte| {
                let m = BigUint::from(byte);
                self.encrypt_int(&m).map(|c| bigint::to_decimal(&c))
            })
            .collect();
        Ok(tokens?.join(" "))
    }

    /// `s^e mod n`, compared against the expected hash of `message` under
    /// this key's modulus.
    pub fn verify_hash(&self, message: &[u8], signature: &BigUint) -> bool {
        let recovered = bigint::power_mod(signature, &self.e, &self.n);
        recovered == hash_to_int(message, &self.n)
    }
}

/// The scheme's own non-cryptographic "hash": `hash = hash*256 + byte`
/// folded over message bytes, reduced mod `modulus` at each step.
pub fn hash_to_int(message: &[u8], modulus: &BigUint) -> BigUint {
    bigint::bytes_to_biguint_mod(message, modulus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_int_round_trips() {
        let kp = RsaKeyPair::generate(64);
        let pk = kp.public();
        let m = BigUint::from(42u32);
        let c = pk.encrypt_int(&m).unwrap();
        assert_eq!(kp.decrypt_int(&c), m);
    }

    #[test]
    fn encrypt_decrypt_bytes_round_trips() {
        let kp = RsaKeyPair::generate(64);
        let pk = kp.public();
        let plaintext = b"hello, rsa";
        let ciphertext = pk.encrypt_bytes(plaintext).unwrap();
        let recovered = kp.decrypt_bytes(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn sign_verify_round_trips() {
        let kp = RsaKeyPair::generate(64);
        let pk = kp.public();
        let message = b"certificate payload";
        let signature = kp.sign_hash(message);
        assert!(pk.verify_hash(message, &signature));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let kp = RsaKeyPair::generate(64);
        let pk = kp.public();
        let signature = kp.sign_hash(b"original");
        assert!(!pk.verify_hash(b"tampered", &signature));
    }

    #[test]
    fn rejects_message_not_smaller_than_modulus() {
        let kp = RsaKeyPair::generate(64);
        let pk = kp.public();
        assert!(pk.encrypt_int(&kp.n).is_err());
    }
}
