// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for the key/value data set.
//!
//! - [`codec`] converts between an in-memory [`Snapshot`] and one of the
//!   supported on-disk encodings (plain text, JSON, YAML, AES-CBC encrypted
//!   plain text).
//! - [`store`] owns the data file and implements get/insert/replace/remove
//!   as whole-file load-mutate-save cycles through the active codec.
//!
//! ## Storage Layout
//!
//! ```text
//! {KV_DATA_FILE}          # e.g. ./db/database.json
//! {KV_DATA_FILE}.tmp      # transient, renamed over the data file on save
//! ```

pub mod codec;
pub mod store;

pub use codec::{build_codec, Codec, CodecError, Snapshot, StorageFormat};
pub use store::{Store, StoreError, StoreResult};
