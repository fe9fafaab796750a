// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-256-CBC encrypted line encoding.
//!
//! The plaintext is the [`LineCodec`] rendering of the snapshot. It is padded
//! with PKCS#7, encrypted under the configured key with a fresh random IV,
//! and persisted as a JSON container:
//!
//! ```json
//! { "iv": "<32 hex chars>", "encryptedData": "<hex ciphertext>" }
//! ```
//!
//! A new IV is drawn from the OS RNG on every encode. The key is never
//! written to disk.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use super::{Codec, CodecError, LineCodec, Snapshot};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const FORMAT: &str = "encrypted";

/// AES-256 key length in bytes.
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// CBC initialization vector length (one AES block).
const IV_LEN: usize = 16;

/// Persisted container wrapping the ciphertext.
#[derive(Debug, Serialize, Deserialize)]
struct Container {
    iv: String,
    #[serde(rename = "encryptedData")]
    encrypted_data: String,
}

pub struct EncryptedCodec {
    key: [u8; ENCRYPTION_KEY_LEN],
    inner: LineCodec,
}

impl std::fmt::Debug for EncryptedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedCodec").finish_non_exhaustive()
    }
}

impl EncryptedCodec {
    pub fn new(key: [u8; ENCRYPTION_KEY_LEN]) -> Self {
        Self {
            key,
            inner: LineCodec,
        }
    }

    /// Build from a 64 character hex key as found in configuration.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| CodecError::InvalidKey(format!("key is not hex: {e}")))?;
        let key: [u8; ENCRYPTION_KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CodecError::InvalidKey(format!(
                "expected {ENCRYPTION_KEY_LEN} bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self::new(key))
    }
}

impl Codec for EncryptedCodec {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, raw: &[u8]) -> Result<Snapshot, CodecError> {
        let container: Container =
            serde_json::from_slice(raw).map_err(|e| CodecError::decode(FORMAT, e))?;
        let iv = hex::decode(&container.iv)
            .map_err(|e| CodecError::decode(FORMAT, format!("iv is not hex: {e}")))?;
        let ciphertext = hex::decode(&container.encrypted_data)
            .map_err(|e| CodecError::decode(FORMAT, format!("ciphertext is not hex: {e}")))?;

        let plaintext = Aes256CbcDec::new_from_slices(&self.key, &iv)
            .map_err(|_| CodecError::Encryption(format!("iv must be {IV_LEN} bytes")))?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CodecError::Encryption("decryption failed".to_string()))?;

        let text = String::from_utf8(plaintext)
            .map_err(|_| CodecError::Encryption("decrypted data is not text".to_string()))?;
        Ok(self.inner.decode_str(&text))
    }

    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        let plaintext = self.inner.encode_string(snapshot)?;

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| CodecError::Encryption(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let container = Container {
            iv: hex::encode(iv),
            encrypted_data: hex::encode(ciphertext),
        };
        serde_json::to_vec(&container).map_err(|e| CodecError::encode(FORMAT, e))
    }
}
