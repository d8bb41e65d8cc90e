//! Arbitrary-precision nonnegative integer helpers shared by the RSA-style and
//! ElGamal-style public-key engines.
//!
//! `num_bigint::BigUint` is the "BigInt" of the data model: it is already
//! nonnegative by construction, so the invariants this module enforces are
//! about modular arithmetic (`PowerMod`, `InvMod`, `GCD`, primality) and about
//! the strict decimal text form used on the wire, not about sign.

use num::Integer;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::FramingError;

/// `base^exp mod modulus`, via `BigUint`'s own square-and-multiply `modpow`.
pub fn power_mod(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// `gcd(a, b)`.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// The modular multiplicative inverse of `a` mod `modulus`, via the extended
/// Euclidean algorithm carried out over signed `BigInt` and normalized back
/// into `[0, modulus)`.
///
/// Returns `None` if `a` and `modulus` are not coprime.
pub fn inv_mod(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    let (g, x, _y) = extended_gcd(&BigInt::from(a.clone()), &BigInt::from(modulus.clone()));
    if g != BigInt::one() {
        return None;
    }
    let m = BigInt::from(modulus.clone());
    let result = ((x % &m) + &m) % &m;
    result.to_biguint()
}

/// Extended Euclidean algorithm: returns `(gcd, x, y)` such that `a*x + b*y == gcd`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        return (a.clone(), BigInt::one(), BigInt::zero());
    }
    let (q, r) = a.div_rem(b);
    let (g, x1, y1) = extended_gcd(b, &r);
    let x = y1.clone();
    let y = x1 - &q * &y1;
    (g, x, y)
}

/// A uniformly random `BigUint` in `[low, high]` (inclusive on both ends).
pub fn random_range_inclusive<R: Rng + ?Sized>(rng: &mut R, low: &BigUint, high: &BigUint) -> BigUint {
    let span = high - low + BigUint::one();
    low + rng.gen_biguint_below(&span)
}

/// Miller-Rabin primality test with `rounds` independent witnesses.
///
/// This is a probabilistic test: a composite is declared prime with
/// probability at most `4^(-rounds)`. It is adequate for the instructional
/// key sizes this crate targets and is not hardened against adversarially
/// chosen inputs.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    let zero = BigUint::zero();
    let one = BigUint::one();
    let two = &one + &one;

    if *n < two {
        return false;
    }
    if *n == two {
        return true;
    }
    if (n % &two) == zero {
        return false;
    }

    // Write n-1 = 2^r * d with d odd.
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r: u32 = 0;
    while (&d % &two) == zero {
        d /= &two;
        r += 1;
    }

    let mut rng = rand::thread_rng();
    'witness: for _ in 0..rounds {
        let a = random_range_inclusive(&mut rng, &two, &(n - &two));
        let mut x = power_mod(&a, &d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = power_mod(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generates a random probable prime of exactly `bits` bits (top and bottom
/// bit forced to 1, so the result has the requested bit length and is odd).
pub fn gen_prime(bits: u64) -> BigUint {
    let mut rng = rand::thread_rng();
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, 40) {
            return candidate;
        }
    }
}

/// Renders a `BigUint` as a canonical signed-decimal string (this crate's
/// integers are never negative, so the sign is always absent).
pub fn to_decimal(value: &BigUint) -> String {
    value.to_str_radix(10)
}

/// Parses a canonical decimal string into a `BigUint`, rejecting whitespace,
/// empty input, non-digit characters, and leading zeros (other than the
/// single digit `"0"` itself).
pub fn parse_decimal(s: &str) -> Result<BigUint, FramingError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FramingError::InvalidInteger(s.to_string()));
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(FramingError::InvalidInteger(s.to_string()));
    }
    BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| FramingError::InvalidInteger(s.to_string()))
}

/// Converts a byte slice into a `BigUint` via `Sign::Plus` big-endian encoding
/// (used by `hash_to_int`, which treats a hex digest string's bytes as digits
/// of a base-256 number mod the key's modulus).
pub fn bytes_to_biguint_mod(bytes: &[u8], modulus: &BigUint) -> BigUint {
    let mut acc = BigUint::zero();
    let base = BigUint::from(256u32);
    for &b in bytes {
        acc = (&acc * &base + BigUint::from(b)) % modulus;
    }
    acc
}
