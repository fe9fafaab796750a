// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational KV - Authenticated Multi-Format Key/Value Service
//!
//! A flat key → list-of-strings store served over HTTP. The data set lives
//! in a single file whose encoding is chosen at startup, and every data
//! request passes an access gate first.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - User registry, credential checks, session tokens, access gate
//! - `config` - Startup configuration (YAML file + environment)
//! - `storage` - Codecs (plain, JSON, YAML, encrypted) and the file store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
