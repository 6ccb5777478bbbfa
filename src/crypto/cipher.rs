// ABOUTME: AES-256-GCM cipher producing opaque base64url blobs for cookie storage
// ABOUTME: Loads the process-wide key from configuration and fails fast when absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Process-wide AEAD cipher for token payloads
//!
//! The key is supplied once at process start as base64-encoded 32 bytes.
//! There is deliberately no ephemeral fallback: a generated key would make
//! every blob written before a restart permanently undecryptable, so a
//! missing key is a startup failure instead.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead},
    Aes256Gcm, KeyInit,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine};
use rand::RngCore;

/// Nonce length for AES-GCM
const NONCE_LEN: usize = 12;

/// AEAD cipher keyed by the process-wide cookie encryption secret
pub struct TokenCipher {
    key: [u8; 32],
}

impl TokenCipher {
    /// Create a cipher from raw key bytes
    #[must_use]
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Load the cipher key from a base64-encoded string.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoding is invalid or the decoded key is not
    /// exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let key_bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| anyhow!("Invalid base64 encoding in cookie encryption key: {e}"))?;

        if key_bytes.len() != 32 {
            return Err(anyhow!(
                "Cookie encryption key must be exactly 32 bytes, got {} bytes",
                key_bytes.len()
            ));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes);
        Ok(Self { key })
    }

    /// Encrypt a plaintext payload into an opaque base64url blob.
    ///
    /// A random 12-byte nonce is prepended to the ciphertext before
    /// encoding, so every blob is unique even for identical payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| anyhow!("Encryption failed: {e}"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(blob))
    }

    /// Decrypt an opaque blob produced by [`Self::seal`].
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not valid base64url, is too short to
    /// carry a nonce, or fails authenticated decryption (corrupted or
    /// foreign data).
    pub fn open(&self, blob: &str) -> Result<Vec<u8>> {
        let data = general_purpose::URL_SAFE_NO_PAD
            .decode(blob)
            .map_err(|e| anyhow!("Invalid blob encoding: {e}"))?;

        if data.len() < NONCE_LEN {
            return Err(anyhow!("Encrypted blob too short"));
        }

        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));
        let nonce = GenericArray::from_slice(&data[..NONCE_LEN]);

        cipher
            .decrypt(nonce, &data[NONCE_LEN..])
            .map_err(|e| anyhow!("Decryption failed: {e}"))
    }
}

/// Generate a random 32-byte key, e.g. for tests or key provisioning
#[must_use]
pub fn generate_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    key
}
