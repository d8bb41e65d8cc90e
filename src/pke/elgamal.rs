//! A textbook ElGamal variant over a safe-prime multiplicative group: key
//! generation, raw integer encrypt/decrypt, byte-wise message encrypt/decrypt,
//! and a hash-and-sign scheme used for certificate self-signatures.
//!
//! ## Algorithm: key generation
//! Draw a safe prime `p = 2q + 1` (`q` prime, `p` prime) of `bits` bits.
//! Search for a generator `g` of the order-`q` subgroup by trying random
//! candidates `h` in `[2, p - 2]` and checking `h^((p-1)/f) != 1 mod p` for
//! each prime factor `f` of `p - 1` (here `{2, q}`), bounded at 1000 attempts.
//! Draw the private exponent `x` uniformly from `[1, p - 2]`; the public key
//! is `h = g^x mod p`.
//!
//! ## Algorithm: encrypt/decrypt
//! Encryption draws an ephemeral `k` in `[1, p - 2]` and emits the pair
//! `(c1, c2) = (g^k mod p, m * h^k mod p)`. Decryption recovers
//! `m = c2 * (c1^x)^-1 mod p`.
//!
//! ## Algorithm: hash-and-sign
//! The classic ElGamal signature: draw ephemeral `k` coprime to `p - 1`,
//! `r = g^k mod p`, `s = (hash - x*r) * k^-1 mod (p - 1)`. Verification
//! checks `g^hash == h^r * r^s mod p`.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use rayon::prelude::*;

use crate::bigint;
use crate::error::PkeError;

const GENERATOR_SEARCH_ATTEMPTS: u32 = 1000;

/// The public half of an ElGamal-style keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalPublicKey {
    pub p: BigUint,
    pub g: BigUint,
    pub h: BigUint,
}

/// A full ElGamal-style keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalKeyPair {
    pub p: BigUint,
    pub g: BigUint,
    pub h: BigUint,
    pub x: BigUint,
}

impl ElGamalKeyPair {
    /// Generates a fresh keypair over a safe prime of approximately `bits`
    /// bits.
    pub fn generate(bits: u64) -> Result<Self, PkeError> {
        let (p, q) = generate_safe_prime(bits);
        let g = find_generator(&p, &q)?;

        let mut rng = rand::thread_rng();
        let two = BigUint::from(2u32);
        let x = bigint::random_range_inclusive(&mut rng, &BigUint::one(), &(&p - &two));
        let h = bigint::power_mod(&g, &x, &p);

        Ok(ElGamalKeyPair { p, g, h, x })
    }

    /// Reconstructs a keypair from a known prime/generator pair and a private
    /// exponent. Used when loading a previously generated identity rather
    /// than minting a fresh one.
    pub fn from_private(p: BigUint, g: BigUint, x: BigUint) -> Self {
        let h = bigint::power_mod(&g, &x, &p);
        ElGamalKeyPair { p, g, h, x }
    }

    pub fn public(&self) -> ElGamalPublicKey {
        ElGamalPublicKey {
            p: self.p.clone(),
            g: self.g.clone(),
            h: self.h.clone(),
        }
    }

    /// `m = c2 * (c1^x)^-1 mod p`.
    pub fn decrypt_int(&self, c1: &BigUint, c2: &BigUint) -> BigUint {
        let shared = bigint::power_mod(c1, &self.x, &self.p);
        let shared_inv = bigint::inv_mod(&shared, &self.p).expect("shared secret is invertible mod a prime");
        (c2 * shared_inv) % &self.p
    }

    /// Decrypts a sequence of `c1,c2` pairs, each rendered as two
    /// space-separated decimal integers separated by a comma, one pair per byte.
    pub fn decrypt_bytes(&self, ciphertext: &str) -> Result<Vec<u8>, PkeError> {
        ciphertext
            .split_whitespace()
            .map(|pair| {
                let (c1_str, c2_str) = pair
                    .split_once(',')
                    .ok_or_else(|| PkeError::ByteOutOfRange(pair.to_string()))?;
                let c1 = bigint::parse_decimal(c1_str)
                    .map_err(|_| PkeError::ByteOutOfRange(pair.to_string()))?;
                let c2 = bigint::parse_decimal(c2_str)
                    .map_err(|_| PkeError::ByteOutOfRange(pair.to_string()))?;
                let m = self.decrypt_int(&c1, &c2);
                m.to_u8()
                    .ok_or_else(|| PkeError::ByteOutOfRange(bigint::to_decimal(&m)))
            })
            .collect()
    }

    /// Classic ElGamal signature over the Horner-reduced hash of `message`.
    pub fn sign_hash(&self, message: &[u8]) -> (BigUint, BigUint) {
        let p_minus_one = &self.p - BigUint::one();
        let hash = hash_to_int(message, &self.p);
        let mut rng = rand::thread_rng();

        loop {
            let k = bigint::random_range_inclusive(&mut rng, &BigUint::one(), &(&p_minus_one - BigUint::one()));
            if bigint::gcd(&k, &p_minus_one) != BigUint::one() {
                continue;
            }
            let r = bigint::power_mod(&self.g, &k, &self.p);
            let k_inv = match bigint::inv_mod(&k, &p_minus_one) {
                Some(v) => v,
                None => continue,
            };

            let xr = (&self.x * &r) % &p_minus_one;
            let diff = if hash >= xr {
                hash.clone() - &xr
            } else {
                &p_minus_one - ((&xr - &hash) % &p_minus_one)
            };
            let s = (diff * k_inv) % &p_minus_one;
            return (r, s);
        }
    }
}

impl ElGamalPublicKey {
    /// `(c1, c2) = (g^k mod p, m * h^k mod p)` for a fresh ephemeral `k`.
    pub fn encrypt_int<R: Rng + ?Sized>(&self, message: &BigUint, rng: &mut R) -> Result<(BigUint, BigUint), PkeError> {
        if message >= &self.p {
            return Err(PkeError::MessageTooLarge(bigint::to_decimal(message)));
        }
        let two = BigUint::from(2u32);
        let k = bigint::random_range_inclusive(rng, &BigUint::one(), &(&self.p - &two));
        let c1 = bigint::power_mod(&self.g, &k, &self.p);
        let shared = bigint::power_mod(&self.h, &k, &self.p);
        let c2 = (message * shared) % &self.p;
        Ok((c1, c2))
    }

    /// Encrypts `plaintext` one byte at a time, rendering each `(c1, c2)`
    /// pair as `"c1,c2"` and joining pairs with spaces.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String, PkeError> {
        let tokens: Result<Vec<String>, PkeError> = plaintext
            .par_iter()
            .map_init(rand::thread_rng, |rng, &byte| {
                let m = BigUint::from(byte);
                let (c1, c2) = self.encrypt_int(&m, rng)?;
                Ok(format!("{},{}", bigint::to_decimal(&c1), bigint::to_decimal(&c2)))
            })
            .collect();
        Ok(tokens?.join(" "))
    }

    /// `g^hash == h^r * r^s mod p`. Rejects `r ∉ (0, p)` or `s ∉ (0, p-1)`.
    pub fn verify_hash(&self, message: &[u8], signature: &(BigUint, BigUint)) -> bool {
        let (r, s) = signature;
        let p_minus_one = &self.p - BigUint::one();
        if r.is_zero() || *r >= self.p || s.is_zero() || *s >= p_minus_one {
            return false;
        }
        let hash = hash_to_int(message, &self.p);
        let lhs = bigint::power_mod(&self.g, &hash, &self.p);
        let rhs = (bigint::power_mod(&self.h, r, &self.p) * bigint::power_mod(r, s, &self.p)) % &self.p;
        lhs == rhs
    }
}

/// The scheme's own non-cryptographic "hash": `hash = hash*256 + byte`
/// folded over message bytes, reduced mod `modulus` at each step.
pub fn hash_to_int(message: &[u8], modulus: &BigUint) -> BigUint {
    bigint::bytes_to_biguint_mod(message, modulus)
}

/// Draws a safe prime `p = 2q + 1` of `bits` bits, returning `(p, q)`.
fn generate_safe_prime(bits: u64) -> (BigUint, BigUint) {
    loop {
        let q = bigint::gen_prime(bits - 1);
        let p = &q * BigUint::from(2u32) + BigUint::one();
        if bigint::is_probable_prime(&p, 40) {
            return (p, q);
        }
    }
}

/// Searches for a generator of the order-`q` subgroup of `Z_p^*`, where
/// `p = 2q + 1`. A candidate `h` generates that subgroup iff
/// `h^2 mod p != 1` and `h^q mod p != 1`.
fn find_generator(p: &BigUint, q: &BigUint) -> Result<BigUint, PkeError> {
    let mut rng = rand::thread_rng();
    let two = BigUint::from(2u32);
    let one = BigUint::one();

    for _ in 0..GENERATOR_SEARCH_ATTEMPTS {
        let h = bigint::random_range_inclusive(&mut rng, &two, &(p - &two));
        if bigint::power_mod(&h, &two, p) == one {
            continue;
        }
        if bigint::power_mod(&h, q, p) == one {
            continue;
        }
        return Ok(h);
    }
    Err(PkeError::GeneratorNotFound(GENERATOR_SEARCH_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_int_round_trips() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let mut rng = rand::thread_rng();
        let m = BigUint::from(7u32);
        let (c1, c2) = pk.encrypt_int(&m, &mut rng).unwrap();
        assert_eq!(kp.decrypt_int(&c1, &c2), m);
    }

    #[test]
    fn encrypt_decrypt_bytes_round_trips() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let plaintext = b"hello, elgamal";
        let ciphertext = pk.encrypt_bytes(plaintext).unwrap();
        let recovered = kp.decrypt_bytes(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn sign_verify_round_trips() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let message = b"certificate payload";
        let signature = kp.sign_hash(message);
        assert!(pk.verify_hash(message, &signature));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let signature = kp.sign_hash(b"original");
        assert!(!pk.verify_hash(b"tampered", &signature));
    }

    #[test]
    fn verify_rejects_out_of_range_s() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let (r, _s) = kp.sign_hash(b"payload");
        let p_minus_one = &kp.p - BigUint::one();
        assert!(!pk.verify_hash(b"payload", &(r.clone(), BigUint::zero())));
        assert!(!pk.verify_hash(b"payload", &(r, p_minus_one)));
    }

    #[test]
    fn rejects_message_not_smaller_than_prime() {
        let kp = ElGamalKeyPair::generate(32).unwrap();
        let pk = kp.public();
        let mut rng = rand::thread_rng();
        assert!(pk.encrypt_int(&kp.p, &mut rng).is_err());
    }
}
