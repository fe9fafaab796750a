// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Codecs
//!
//! A [`Codec`] converts a [`Snapshot`] to and from the bytes persisted in the
//! data file. Four encodings are available:
//!
//! | Format | Codec | On-disk layout |
//! |--------|-------|----------------|
//! | `plain` | [`LineCodec`] | `key value1 value2` per line, `#` comments |
//! | `json` | [`JsonCodec`] | one top-level object, two-space indentation |
//! | `yaml` | [`YamlCodec`] | one top-level mapping |
//! | `encrypted` | [`EncryptedCodec`] | `{"iv": hex, "encryptedData": hex}` wrapping the plain format |
//!
//! Exactly one codec is resolved at startup via [`build_codec`] and shared for
//! the lifetime of the process. Switching formats on an existing data file is
//! not supported: the new codec will refuse to decode the old file.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod encrypted;
pub mod json;
pub mod line;
pub mod yaml;

pub use encrypted::{EncryptedCodec, ENCRYPTION_KEY_LEN};
pub use json::JsonCodec;
pub use line::LineCodec;
pub use yaml::YamlCodec;

/// Full decoded mapping of keys to their ordered value sequences.
pub type Snapshot = BTreeMap<String, Vec<String>>;

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Persisted data could not be parsed by the active codec.
    #[error("malformed {format} data: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// A snapshot could not be serialized by the active codec.
    #[error("failed to encode {format} data: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// A record cannot be represented in the active encoding.
    #[error("record {key:?} cannot be stored as {format}: {reason}")]
    Unrepresentable {
        format: &'static str,
        key: String,
        reason: &'static str,
    },

    /// Decryption failed (wrong key, corrupted ciphertext, bad IV).
    #[error("encryption failure: {0}")]
    Encryption(String),

    /// Key material supplied by configuration is unusable.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
}

impl CodecError {
    pub(crate) fn decode(format: &'static str, message: impl fmt::Display) -> Self {
        CodecError::Decode {
            format,
            message: message.to_string(),
        }
    }

    pub(crate) fn encode(format: &'static str, message: impl fmt::Display) -> Self {
        CodecError::Encode {
            format,
            message: message.to_string(),
        }
    }
}

/// Paired encode/decode transform between a [`Snapshot`] and raw bytes.
pub trait Codec: Send + Sync {
    /// Short format name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Parse persisted bytes into a snapshot.
    fn decode(&self, raw: &[u8]) -> Result<Snapshot, CodecError>;

    /// Serialize a snapshot into the bytes to persist.
    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError>;
}

/// On-disk encoding selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[serde(alias = "text")]
    Plain,
    Json,
    #[serde(alias = "yml")]
    Yaml,
    Encrypted,
}

impl StorageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFormat::Plain => "plain",
            StorageFormat::Json => "json",
            StorageFormat::Yaml => "yaml",
            StorageFormat::Encrypted => "encrypted",
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(StorageFormat::Plain),
            "json" => Ok(StorageFormat::Json),
            "yaml" | "yml" => Ok(StorageFormat::Yaml),
            "encrypted" => Ok(StorageFormat::Encrypted),
            other => Err(format!("unknown storage format '{other}'")),
        }
    }
}

/// Resolve the active codec for `format`.
///
/// `encryption_key` is the hex-encoded AES-256 key and is only consulted
/// for [`StorageFormat::Encrypted`].
pub fn build_codec(
    format: StorageFormat,
    encryption_key: Option<&str>,
) -> Result<Arc<dyn Codec>, CodecError> {
    let codec: Arc<dyn Codec> = match format {
        StorageFormat::Plain => Arc::new(LineCodec),
        StorageFormat::Json => Arc::new(JsonCodec),
        StorageFormat::Yaml => Arc::new(YamlCodec),
        StorageFormat::Encrypted => {
            let key = encryption_key.ok_or_else(|| {
                CodecError::InvalidKey("encrypted format requires a key".to_string())
            })?;
            Arc::new(EncryptedCodec::from_hex_key(key)?)
        }
    };
    Ok(codec)
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.insert(
        "fruit".to_string(),
        vec!["apple".to_string(), "banana".to_string()],
    );
    snapshot.insert("empty".to_string(), Vec::new());
    snapshot.insert(
        "hosts".to_string(),
        vec!["10.0.0.1".to_string(), "10.0.0.2:8080".to_string()],
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn format_parses_names_and_aliases() {
        assert_eq!("plain".parse::<StorageFormat>(), Ok(StorageFormat::Plain));
        assert_eq!("TEXT".parse::<StorageFormat>(), Ok(StorageFormat::Plain));
        assert_eq!("json".parse::<StorageFormat>(), Ok(StorageFormat::Json));
        assert_eq!("yml".parse::<StorageFormat>(), Ok(StorageFormat::Yaml));
        assert_eq!(
            " encrypted ".parse::<StorageFormat>(),
            Ok(StorageFormat::Encrypted)
        );
        assert!("xml".parse::<StorageFormat>().is_err());
    }

    #[test]
    fn build_codec_resolves_each_format() {
        assert_eq!(build_codec(StorageFormat::Plain, None).unwrap().name(), "plain");
        assert_eq!(build_codec(StorageFormat::Json, None).unwrap().name(), "json");
        assert_eq!(build_codec(StorageFormat::Yaml, None).unwrap().name(), "yaml");
        assert_eq!(
            build_codec(StorageFormat::Encrypted, Some(KEY)).unwrap().name(),
            "encrypted"
        );
    }

    #[test]
    fn encode_and_decode_failures_are_labelled_apart() {
        let encode = CodecError::encode("json", "boom");
        assert!(matches!(encode, CodecError::Encode { format: "json", .. }));
        assert_eq!(encode.to_string(), "failed to encode json data: boom");
        assert_eq!(
            CodecError::decode("json", "boom").to_string(),
            "malformed json data: boom"
        );
    }

    #[test]
    fn encrypted_format_requires_key() {
        let result = build_codec(StorageFormat::Encrypted, None);
        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }

    #[test]
    fn formats_cannot_read_each_other() {
        let snapshot = sample_snapshot();
        let json = JsonCodec.encode(&snapshot).unwrap();
        assert!(matches!(
            YamlCodec.decode(b"- just\n- a list\n"),
            Err(CodecError::Decode { .. })
        ));
        assert!(matches!(
            EncryptedCodec::from_hex_key(KEY).unwrap().decode(&json),
            Err(CodecError::Decode { .. })
        ));
    }
}
