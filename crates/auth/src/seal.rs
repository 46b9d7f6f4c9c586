//! Session sealing.
//!
//! A sealed session is `base64url(nonce || AES-256-GCM(payload))`, keyed with
//! the SHA-256 digest of the cookie password.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use sessionguard_core::auth::{AuthError, Result, SealedSession};

const NONCE_LEN: usize = 12;

/// Encrypts and authenticates session payloads with a server-side secret.
#[derive(Clone)]
pub struct Sealer {
    cipher: Aes256Gcm,
}

impl Sealer {
    pub fn new(password: &str) -> Self {
        let key = Sha256::digest(password.as_bytes());
        let cipher = Aes256Gcm::new(&key);
        Self { cipher }
    }

    pub fn seal<T: Serialize>(&self, payload: &T) -> Result<SealedSession> {
        let plaintext = serde_json::to_vec(payload).map_err(|e| AuthError::Seal(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| AuthError::Seal("encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(SealedSession::new(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(sealed),
        ))
    }

    /// Returns `None` if the token was not produced by this sealer or was tampered with.
    pub fn unseal<T: DeserializeOwned>(&self, sealed: &SealedSession) -> Option<T> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(sealed.as_str())
            .ok()?;

        if bytes.len() <= NONCE_LEN {
            return None;
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .ok()?;

        serde_json::from_slice(&plaintext).ok()
    }
}

impl std::fmt::Debug for Sealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sealer")
    }
}
