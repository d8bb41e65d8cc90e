//! Public-key engines: a textbook RSA variant and a textbook ElGamal variant,
//! both built directly on [`crate::bigint`] rather than any dedicated
//! number-theory or PKE crate.
//!
//! Neither engine here is a hardened, padded, production KEM — there is no
//! OAEP, no PSS, no IND-CCA2 argument. Messages are encrypted byte-by-byte as
//! raw integers, exactly as the protocol this crate implements requires.

pub mod elgamal;
pub mod rsa;
