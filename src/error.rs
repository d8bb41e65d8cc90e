//! Error types for every fallible boundary in the crate.
//!
//! Each module that can fail owns a narrow `thiserror` enum scoped to its own
//! concerns. [`ProtocolError`] composes the others via `#[from]` so the
//! handshake and message loop can propagate with a single `?`.

use thiserror::Error;

/// Failures from the AES-128/ECB/PKCS#7 block cipher engine.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key supplied was not exactly 16 bytes.
    #[error("AES-128 key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// PKCS#7 unpadding found a malformed trailer.
    #[error("invalid PKCS#7 padding")]
    InvalidPadding,

    /// Ciphertext length was not a positive multiple of the block size.
    #[error("ciphertext length {0} is not a multiple of the AES block size")]
    InvalidCiphertextLength(usize),
}

/// Failures from the RSA-style and ElGamal-style public-key engines.
#[derive(Debug, Error)]
pub enum PkeError {
    /// A plaintext integer was not smaller than the modulus it is encrypted under.
    #[error("message {0} is too large for this key's modulus")]
    MessageTooLarge(String),

    /// ElGamal generator search exceeded its attempt budget.
    #[error("failed to find a generator after {0} attempts")]
    GeneratorNotFound(u32),

    /// A byte sequence could not be reassembled from decrypted integers.
    #[error("decrypted integer {0} does not fit in a single byte")]
    ByteOutOfRange(String),
}

/// Failures parsing the length-prefixed wire framing shared by certificates and envelopes.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The buffer ended before a declared length-prefixed field could be read.
    #[error("truncated frame: expected {expected} bytes, had {available}")]
    Truncated { expected: usize, available: usize },

    /// A decimal big-integer field did not parse.
    #[error("invalid decimal integer: {0:?}")]
    InvalidInteger(String),

    /// Field bytes were not valid UTF-8.
    #[error("invalid UTF-8 in frame field")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Underlying transport I/O error while reading/writing a frame.
    #[error("transport error while framing")]
    Io(#[from] std::io::Error),
}

/// Failures building, signing, verifying, or (de)serializing a [`crate::certificate::Certificate`].
#[derive(Debug, Error)]
pub enum CertificateError {
    /// Wire bytes did not decode into a well-formed certificate.
    #[error("malformed certificate encoding")]
    Malformed(#[from] FramingError),

    /// The ElGamal self-signature failed to verify.
    #[error("certificate self-signature does not verify")]
    SignatureInvalid,
}

/// Failures wrapping or unwrapping a [`crate::envelope::Envelope`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Wrapping failed in the underlying RSA engine.
    #[error("envelope key wrap failed")]
    Pke(#[from] PkeError),

    /// Wrapping/unwrapping failed in the underlying AES engine.
    #[error("envelope payload cipher failed")]
    Cipher(#[from] CipherError),

    /// Wire bytes did not decode into a well-formed envelope.
    #[error("malformed envelope encoding")]
    Malformed(#[from] FramingError),

    /// The recovered plaintext's digest did not match the transmitted digest.
    #[error("envelope integrity check failed")]
    IntegrityFailure,
}

/// Failures from the handshake and message-exchange loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Transport-level I/O failure (connect, accept, send, recv).
    #[error("transport error")]
    Transport(#[from] std::io::Error),

    /// Peer certificate failed to decode.
    #[error("certificate error")]
    Certificate(#[from] CertificateError),

    /// Peer certificate decoded but its self-signature did not verify.
    #[error("handshake failed: peer certificate does not verify")]
    HandshakeFailed,

    /// An envelope could not be unwrapped.
    #[error("envelope error")]
    Envelope(#[from] EnvelopeError),
}
