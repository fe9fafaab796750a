// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Access control for the key/value API.
//!
//! ## Auth Flow
//!
//! 1. Users are loaded once from a static registry of bcrypt hashes
//!    (`KV_USERS_FILE`).
//! 2. Depending on `KV_AUTH_MODE`, every data request carries either:
//!    - `basic`: `Authorization: Basic <base64 user:pass>` (or the
//!      `username` / `password` headers), verified against the registry
//!    - `token`: `Authorization: Bearer <token>` obtained from
//!      `POST /v1/login`, verified by signature and expiry
//! 3. The middleware rejects the request before any handler runs, or
//!    attaches the [`AuthenticatedUser`] to the request extensions.
//!
//! ## Security
//!
//! - Unknown users and wrong passwords are indistinguishable (same
//!   response, same bcrypt work)
//! - Rejection reasons are logged but never returned to the client
//! - Tokens expire one hour after issue, with no clock-skew leeway

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod session;
pub mod users;

pub use claims::{AuthMethod, AuthenticatedUser, SessionClaims};
pub use credentials::{hash_password, CredentialVerifier, DEFAULT_HASH_COST};
pub use error::AuthError;
pub use extractor::Auth;
pub use gate::{AccessGate, Presented};
pub use middleware::require_auth;
pub use session::{IssuedToken, SessionAuthority, TOKEN_TTL_SECS};
pub use users::{RegistryError, UserEntry, UserRegistry};
