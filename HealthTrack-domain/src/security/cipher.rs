//! Sealing of device-provider secrets before they reach the database.
//!
//! A sealed secret is a versioned envelope
//! `enc:v1:<key_id>:<nonce>:<ciphertext>` with both binary parts in
//! unpadded base64url. The cipher is ChaCha20-Poly1305 with a random 96-bit
//! nonce per secret.

use std::env;
use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

/// Envelope prefix of every sealed secret
pub const ENVELOPE_PREFIX: &str = "enc:v1:";

/// Environment variable holding the base64 32-byte key
pub const ENCRYPTION_KEY_ENV: &str = "CREDENTIAL_ENCRYPTION_KEY";

/// Environment variable naming the key, recorded in each envelope
pub const KEY_ID_ENV: &str = "CREDENTIAL_KEY_ID";

const DEFAULT_KEY_ID: &str = "default";
const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Credential encryption key is invalid: {0}")]
    InvalidKey(String),

    #[error("Sealed secret is malformed: {0}")]
    MalformedEnvelope(String),

    #[error("Sealed secret uses key '{0}', which is not configured")]
    UnknownKey(String),

    #[error("Failed to encrypt secret")]
    Encrypt,

    #[error("Failed to decrypt secret")]
    Decrypt,
}

/// Seals and opens device-provider secrets
#[derive(Clone)]
pub struct CredentialCipher {
    key_id: String,
    key: [u8; 32],
}

// Keep key material out of logs
impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl CredentialCipher {
    pub fn new(key_id: impl Into<String>, key: [u8; 32]) -> Self {
        Self {
            key_id: key_id.into(),
            key,
        }
    }

    /// Build a cipher from a base64 (standard or url-safe) 32-byte key
    pub fn from_base64(key_id: impl Into<String>, encoded: &str) -> Result<Self, CipherError> {
        let encoded = encoded.trim();
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .or_else(|_| STANDARD.decode(encoded.as_bytes()))
            .map_err(|e| CipherError::InvalidKey(format!("invalid base64: {}", e)))?;

        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self::new(key_id, key))
    }

    /// Derive a key from another secret with SHA-256
    pub fn derived_from(key_id: impl Into<String>, secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self::new(key_id, key)
    }

    /// Load the key from `CREDENTIAL_ENCRYPTION_KEY`, or derive one from
    /// `fallback_secret` when it is unset.
    pub fn from_env(fallback_secret: &str) -> Result<Self, CipherError> {
        let key_id = env::var(KEY_ID_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY_ID.to_string());

        match env::var(ENCRYPTION_KEY_ENV) {
            Ok(encoded) if !encoded.trim().is_empty() => Self::from_base64(key_id, &encoded),
            _ => {
                warn!(
                    "{} is not set; deriving the credential key from the JWT secret",
                    ENCRYPTION_KEY_ENV
                );
                Ok(Self::derived_from(key_id, fallback_secret))
            }
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn is_sealed(value: &str) -> bool {
        value.starts_with(ENVELOPE_PREFIX)
    }

    /// Encrypt `plaintext` into an envelope
    pub fn seal(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let aead = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let ciphertext = aead
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        Ok(format!(
            "{}{}:{}:{}",
            ENVELOPE_PREFIX,
            self.key_id,
            URL_SAFE_NO_PAD.encode(nonce_bytes),
            URL_SAFE_NO_PAD.encode(ciphertext)
        ))
    }

    /// Decrypt an envelope produced by `seal`
    pub fn open(&self, envelope: &str) -> Result<String, CipherError> {
        let body = envelope
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| CipherError::MalformedEnvelope("missing enc:v1 prefix".to_string()))?;

        let parts: Vec<&str> = body.split(':').collect();
        let [key_id, nonce_b64, ciphertext_b64] = parts.as_slice() else {
            return Err(CipherError::MalformedEnvelope(format!(
                "expected 3 fields after the prefix, found {}",
                parts.len()
            )));
        };

        if *key_id != self.key_id {
            return Err(CipherError::UnknownKey(key_id.to_string()));
        }

        let nonce = URL_SAFE_NO_PAD
            .decode(nonce_b64.as_bytes())
            .map_err(|e| CipherError::MalformedEnvelope(format!("nonce: {}", e)))?;
        if nonce.len() != NONCE_LEN {
            return Err(CipherError::MalformedEnvelope("nonce length is invalid".to_string()));
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext_b64.as_bytes())
            .map_err(|e| CipherError::MalformedEnvelope(format!("payload: {}", e)))?;

        let aead = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let plaintext = aead
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Decrypt)
    }
}
