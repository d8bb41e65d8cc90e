//! Hybrid-encrypted chat messages: a fresh AES-128 key per message, wrapped
//! under the recipient's RSA public key, with the AES-encrypted payload and
//! a SHA-256 digest for tamper detection.
//!
//! ## Algorithm
//! `wrap` draws a fresh 16-character alphanumeric string as the AES key,
//! encrypts that key byte-by-byte under the recipient's RSA key, AES/ECB/
//! PKCS#7-encrypts the plaintext under the same key, and records
//! `sha256(plaintext)` alongside. `unwrap` reverses each step and rejects the
//! envelope if the recovered plaintext's digest does not match the recorded
//! one.

use rand::Rng;

use crate::cipher;
use crate::digest;
use crate::error::EnvelopeError;
use crate::framing;
use crate::pke::rsa::{RsaKeyPair, RsaPublicKey};

const AES_KEY_LEN: usize = 16;
const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A single wrapped message ready to be framed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The AES key, RSA-encrypted byte-by-byte (space-separated decimal integers).
    pub wrapped_key: String,
    /// The plaintext, AES/ECB/PKCS#7-encrypted under the wrapped key.
    pub ciphertext: Vec<u8>,
    /// `sha256(plaintext)`, checked on unwrap.
    pub digest_hex: String,
}

/// Draws a fresh 16-character AES key from the alphanumeric alphabet.
fn generate_aes_key() -> String {
    let mut rng = rand::thread_rng();
    (0..AES_KEY_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..KEY_ALPHABET.len());
            KEY_ALPHABET[idx] as char
        })
        .collect()
}

impl Envelope {
    /// Wraps `plaintext` for the party owning `recipient`.
    pub fn wrap(plaintext: &[u8], recipient: &RsaPublicKey) -> Result<Self, EnvelopeError> {
        let aes_key = generate_aes_key();
        let wrapped_key = recipient.encrypt_bytes(aes_key.as_bytes())?;
        let ciphertext = cipher::encrypt(plaintext, aes_key.as_bytes())?;
        let digest_hex = digest::digest_hex(plaintext);

        Ok(Envelope {
            wrapped_key,
            ciphertext,
            digest_hex,
        })
    }

    /// Unwraps this envelope using the local RSA keypair, returning the
    /// recovered plaintext only if its digest matches the recorded one.
    pub fn unwrap(&self, local_keys: &RsaKeyPair) -> Result<Vec<u8>, EnvelopeError> {
        let aes_key_bytes = local_keys.decrypt_bytes(&self.wrapped_key)?;
        let plaintext = cipher::decrypt(&self.ciphertext, &aes_key_bytes)?;

        if digest::digest_hex(&plaintext) != self.digest_hex {
            return Err(EnvelopeError::IntegrityFailure);
        }
        Ok(plaintext)
    }

    /// Writes this envelope as a single length-prefixed frame: wrapped key,
    /// ciphertext, and digest, each preceded by its own length.
    pub fn send<W: std::io::Write>(&self, stream: &mut W) -> Result<(), EnvelopeError> {
        let mut payload = Vec::new();
        write_sub_frame(&mut payload, self.wrapped_key.as_bytes());
        write_sub_frame(&mut payload, &self.ciphertext);
        write_sub_frame(&mut payload, self.digest_hex.as_bytes());
        framing::write_frame(stream, &payload).map_err(EnvelopeError::Malformed)
    }

    /// Reads a single envelope previously written with [`Envelope::send`].
    pub fn receive<R: std::io::Read>(stream: &mut R) -> Result<Self, EnvelopeError> {
        let payload = framing::read_frame(stream).map_err(EnvelopeError::Malformed)?;
        let mut cursor = std::io::Cursor::new(payload);

        let wrapped_key_bytes = framing::read_frame(&mut cursor).map_err(EnvelopeError::Malformed)?;
        let ciphertext = framing::read_frame(&mut cursor).map_err(EnvelopeError::Malformed)?;
        let digest_bytes = framing::read_frame(&mut cursor).map_err(EnvelopeError::Malformed)?;

        let wrapped_key = String::from_utf8(wrapped_key_bytes)
            .map_err(|e| EnvelopeError::Malformed(crate::error::FramingError::InvalidUtf8(e.utf8_error())))?;
        let digest_hex = String::from_utf8(digest_bytes)
            .map_err(|e| EnvelopeError::Malformed(crate::error::FramingError::InvalidUtf8(e.utf8_error())))?;

        Ok(Envelope {
            wrapped_key,
            ciphertext,
            digest_hex,
        })
    }
}

fn write_sub_frame(buf: &mut Vec<u8>, payload: &[u8]) {
    framing::write_frame(buf, payload).expect("writing to an in-memory Vec never fails");
}
