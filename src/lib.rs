//! A self-signed two-party secure chat endpoint built on hand-rolled RSA,
//! ElGamal, AES-128, and SHA-256.
//!
//! No primitive here delegates to an established cryptographic library:
//! [`digest`] implements SHA-256 from FIPS 180-4, [`cipher`] implements
//! AES-128 from FIPS 197, and [`pke`] implements RSA- and ElGamal-style
//! public-key schemes directly over [`bigint`]'s `BigUint` arithmetic.
//! [`certificate`] and [`envelope`] build the self-signed handshake and
//! hybrid-encrypted message format on top of those primitives, and
//! [`protocol`] drives the TCP session that ties it all together.

pub mod bigint;
pub mod certificate;
pub mod cipher;
pub mod cli;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod framing;
pub mod identity;
pub mod pke;
pub mod protocol;
