//! Keyed encryption codec: `seal`/`open` a structured object under a
//! string-derived key, returning a printable token.
//!
//! Built on ChaCha20-Poly1305 via the pure-Rust `chacha20poly1305` crate,
//! with a fresh random nonce prepended to the ciphertext on each seal. The
//! byte-buffer primitive is wrapped in a generic `seal<T: Serialize>` /
//! `open<T: DeserializeOwned>` pair so callers work with their own structs
//! rather than raw buffers.

use crate::encoding::base64;
use crate::error::{KerberosError, KerberosResult};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key as CipherKey, Nonce};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;

/// A derived, opaque symmetric key. The only constructor is
/// `derive_from_secret`; nothing outside this module can observe the raw
/// bytes, which keeps every caller honest about treating keys as opaque
/// handles rather than byte buffers to be logged or compared directly.
#[derive(Clone)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Derives a fixed-length key from an arbitrary secret (a password, or
    /// another key's raw material used as a string) by truncating a SHA-256
    /// digest to the cipher's key size. Deterministic: the same secret
    /// always derives the same key, which is what lets a client rederive
    /// `K_c` from a password on every run without persisting it.
    pub fn derive_from_secret(secret: &[u8]) -> Key {
        let digest = Sha256::digest(secret);
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&digest[..KEY_SIZE]);
        Key(key)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(CipherKey::from_slice(&self.0))
    }
}

/// Seals `obj` under `key`, returning a printable (base64) token. The object
/// is first serialized to its canonical JSON byte form, then encrypted under
/// a fresh random nonce which is prepended to the ciphertext before
/// base64 encoding.
pub fn seal<T: Serialize>(obj: &T, key: &Key) -> KerberosResult<String> {
    let plaintext = serde_json::to_vec(obj)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()
        .encrypt(
            nonce,
            Payload {
                msg: &plaintext,
                aad: b"",
            },
        )
        .map_err(|_| KerberosError::DecryptFailure)?;

    let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    token.extend_from_slice(&nonce_bytes);
    token.extend_from_slice(&ciphertext);
    Ok(base64::encode(&token))
}

/// Reverses `seal`. Fails with `KerberosError::DecryptFailure` whenever the
/// token does not base64-decode, is too short to contain a nonce, does not
/// authenticate under `key` (wrong key, or tampering), or whose plaintext
/// does not parse as `T`.
pub fn open<T: DeserializeOwned>(token: &str, key: &Key) -> KerberosResult<T> {
    let raw = base64::decode(token).map_err(|_| KerberosError::DecryptFailure)?;
    if raw.len() < NONCE_SIZE {
        return Err(KerberosError::DecryptFailure);
    }
    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = key
        .cipher()
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: b"",
            },
        )
        .map_err(|_| KerberosError::DecryptFailure)?;

    serde_json::from_slice(&plaintext).map_err(|_| KerberosError::DecryptFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Envelope {
        id: String,
        value: u32,
    }

    #[test]
    fn seal_open_round_trip() {
        let key = Key::derive_from_secret(b"correct horse battery staple");
        let obj = Envelope {
            id: "alice".into(),
            value: 42,
        };
        let token = seal(&obj, &key).unwrap();
        let opened: Envelope = open(&token, &key).unwrap();
        assert_eq!(obj, opened);
    }

    #[test]
    fn open_fails_under_wrong_key() {
        let key1 = Key::derive_from_secret(b"pw");
        let key2 = Key::derive_from_secret(b"pw2");
        let obj = Envelope {
            id: "alice".into(),
            value: 1,
        };
        let token = seal(&obj, &key1).unwrap();
        let result: KerberosResult<Envelope> = open(&token, &key2);
        assert!(matches!(result, Err(KerberosError::DecryptFailure)));
    }

    #[test]
    fn open_fails_on_tampered_token() {
        let key = Key::derive_from_secret(b"pw");
        let obj = Envelope {
            id: "alice".into(),
            value: 1,
        };
        let mut token_bytes = base64::decode(&seal(&obj, &key).unwrap()).unwrap();
        let last = token_bytes.len() - 1;
        token_bytes[last] ^= 0xff;
        let tampered = base64::encode(&token_bytes);
        let result: KerberosResult<Envelope> = open(&tampered, &key);
        assert!(result.is_err());
    }

    #[test]
    fn seal_is_nondeterministic_due_to_random_nonce() {
        let key = Key::derive_from_secret(b"pw");
        let obj = Envelope {
            id: "alice".into(),
            value: 1,
        };
        let token_a = seal(&obj, &key).unwrap();
        let token_b = seal(&obj, &key).unwrap();
        assert_ne!(token_a, token_b);
    }
}
