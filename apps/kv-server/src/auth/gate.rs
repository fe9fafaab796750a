// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access gate: decides AUTHORIZED / REJECTED for each request.
//!
//! The gate is resolved once at startup into one of two modes and never
//! re-reads configuration per request:
//!
//! - **Basic**: every request carries a username and password, checked by
//!   the [`CredentialVerifier`].
//! - **Token**: every request carries a bearer token issued by `/v1/login`,
//!   checked by the [`SessionAuthority`].

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64ct::{Base64, Encoding};

use super::{AuthError, AuthenticatedUser, CredentialVerifier, SessionAuthority};

/// Legacy per-request credential headers.
const USERNAME_HEADER: &str = "username";
const PASSWORD_HEADER: &str = "password";

/// Authentication material found on a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Presented {
    Basic { username: String, password: String },
    Bearer(String),
    Nothing,
}

impl std::fmt::Debug for Presented {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presented::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Presented::Bearer(_) => f.write_str("Bearer(..)"),
            Presented::Nothing => f.write_str("Nothing"),
        }
    }
}

impl Presented {
    /// Extract credentials from request headers.
    ///
    /// Accepts `Authorization: Basic|Bearer ...`, falling back to separate
    /// `username` / `password` headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        if let Some(value) = headers.get(AUTHORIZATION) {
            let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
            return Self::parse_authorization(value);
        }

        let username = header_str(headers, USERNAME_HEADER)?;
        let password = header_str(headers, PASSWORD_HEADER)?;
        match (username, password) {
            (Some(username), Some(password)) => Ok(Presented::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Ok(Presented::Nothing),
        }
    }

    fn parse_authorization(value: &str) -> Result<Self, AuthError> {
        let (scheme, rest) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::InvalidAuthHeader)?;
        let rest = rest.trim();

        if scheme.eq_ignore_ascii_case("bearer") {
            if rest.is_empty() {
                return Err(AuthError::InvalidAuthHeader);
            }
            return Ok(Presented::Bearer(rest.to_string()));
        }

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = Base64::decode_vec(rest).map_err(|_| AuthError::InvalidAuthHeader)?;
            let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeader)?;
            let (username, password) = decoded
                .split_once(':')
                .ok_or(AuthError::InvalidAuthHeader)?;
            return Ok(Presented::Basic {
                username: username.to_string(),
                password: password.to_string(),
            });
        }

        Err(AuthError::InvalidAuthHeader)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AuthError> {
    headers
        .get(name)
        .map(|v| v.to_str().map_err(|_| AuthError::InvalidAuthHeader))
        .transpose()
}

/// The single access-control mode active for this process.
#[derive(Debug, Clone)]
pub enum AccessGate {
    Basic(Arc<CredentialVerifier>),
    Token {
        sessions: Arc<SessionAuthority>,
        verifier: Arc<CredentialVerifier>,
    },
}

impl AccessGate {
    pub fn basic(verifier: Arc<CredentialVerifier>) -> Self {
        AccessGate::Basic(verifier)
    }

    pub fn token(sessions: Arc<SessionAuthority>, verifier: Arc<CredentialVerifier>) -> Self {
        AccessGate::Token { sessions, verifier }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            AccessGate::Basic(_) => "basic",
            AccessGate::Token { .. } => "token",
        }
    }

    /// Credential verifier, used by the login endpoint in both modes.
    pub fn verifier(&self) -> &CredentialVerifier {
        match self {
            AccessGate::Basic(verifier) => &**verifier,
            AccessGate::Token { verifier, .. } => &**verifier,
        }
    }

    /// Session authority, only present in token mode.
    pub fn sessions(&self) -> Option<&SessionAuthority> {
        match self {
            AccessGate::Basic(_) => None,
            AccessGate::Token { sessions, .. } => Some(&**sessions),
        }
    }

    /// Read credentials from request headers.
    ///
    /// In token mode a malformed `Authorization` header is reported as
    /// [`AuthError::InvalidBearerHeader`] so the rejection advertises the
    /// bearer scheme.
    pub fn presented(&self, headers: &HeaderMap) -> Result<Presented, AuthError> {
        Presented::from_headers(headers).map_err(|e| match (self, e) {
            (AccessGate::Token { .. }, AuthError::InvalidAuthHeader) => {
                AuthError::InvalidBearerHeader
            }
            (_, e) => e,
        })
    }

    /// Decide whether the presented material authorizes the request.
    ///
    /// Blocking: credential mode runs bcrypt.
    pub fn check(&self, presented: &Presented) -> Result<AuthenticatedUser, AuthError> {
        match self {
            AccessGate::Basic(verifier) => match presented {
                Presented::Basic { username, password } => {
                    if verifier.verify(username, password) {
                        Ok(AuthenticatedUser::from_credentials(username.as_str()))
                    } else {
                        Err(AuthError::InvalidCredentials)
                    }
                }
                Presented::Bearer(_) | Presented::Nothing => Err(AuthError::MissingCredentials),
            },
            AccessGate::Token { sessions, .. } => match presented {
                Presented::Bearer(token) => sessions
                    .verify(token)
                    .map(AuthenticatedUser::from_claims),
                Presented::Basic { .. } | Presented::Nothing => Err(AuthError::MissingToken),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::{hash_password, UserEntry, UserRegistry};

    pub const USERNAME: &str = "alice";
    pub const PASSWORD: &str = "wonderland";
    pub const SECRET: &[u8] = b"gate-test-secret";

    pub fn verifier() -> Arc<CredentialVerifier> {
        let registry = UserRegistry::from_entries(vec![UserEntry {
            username: USERNAME.into(),
            password_hash: hash_password(PASSWORD, 4).unwrap(),
        }])
        .unwrap();
        Arc::new(CredentialVerifier::new(registry).unwrap())
    }

    pub fn basic_gate() -> AccessGate {
        AccessGate::basic(verifier())
    }

    pub fn token_gate() -> AccessGate {
        AccessGate::token(Arc::new(SessionAuthority::new(SECRET)), verifier())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn basic(username: &str, password: &str) -> Presented {
        Presented::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn parses_basic_authorization() {
        // "alice:wonder:land" keeps everything after the first colon.
        let encoded = Base64::encode_string(b"alice:wonder:land");
        let presented =
            Presented::from_headers(&headers(&[("authorization", &format!("Basic {encoded}"))]))
                .unwrap();
        assert_eq!(presented, basic("alice", "wonder:land"));
    }

    #[test]
    fn parses_bearer_authorization() {
        let presented =
            Presented::from_headers(&headers(&[("authorization", "Bearer abc.def.ghi")])).unwrap();
        assert_eq!(presented, Presented::Bearer("abc.def.ghi".into()));
    }

    #[test]
    fn parses_legacy_headers() {
        let presented =
            Presented::from_headers(&headers(&[("username", "alice"), ("password", "pw")]))
                .unwrap();
        assert_eq!(presented, basic("alice", "pw"));
    }

    #[test]
    fn nothing_presented() {
        assert_eq!(
            Presented::from_headers(&HeaderMap::new()).unwrap(),
            Presented::Nothing
        );
        assert_eq!(
            Presented::from_headers(&headers(&[("username", "alice")])).unwrap(),
            Presented::Nothing
        );
    }

    #[test]
    fn rejects_malformed_authorization() {
        for value in ["Basic", "Basic !!!", "Digest abc", "Bearer  "] {
            let result = Presented::from_headers(&headers(&[("authorization", value)]));
            assert_eq!(result, Err(AuthError::InvalidAuthHeader), "{value}");
        }
    }

    #[test]
    fn malformed_header_is_reported_per_mode() {
        let malformed = headers(&[("authorization", "Bearer  ")]);
        assert_eq!(
            basic_gate().presented(&malformed),
            Err(AuthError::InvalidAuthHeader)
        );
        assert_eq!(
            token_gate().presented(&malformed),
            Err(AuthError::InvalidBearerHeader)
        );

        let token = headers(&[("authorization", "Bearer abc")]);
        assert_eq!(
            token_gate().presented(&token).unwrap(),
            Presented::Bearer("abc".into())
        );
    }

    #[test]
    fn basic_gate_authorizes_valid_credentials() {
        let user = basic_gate().check(&basic(USERNAME, PASSWORD)).unwrap();
        assert_eq!(user.username, USERNAME);
    }

    #[test]
    fn basic_gate_rejections() {
        let gate = basic_gate();
        assert_eq!(
            gate.check(&Presented::Nothing),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            gate.check(&basic(USERNAME, "nope")),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            gate.check(&basic("mallory", PASSWORD)),
            Err(AuthError::InvalidCredentials)
        );
        assert!(gate.sessions().is_none());
    }

    #[test]
    fn token_gate_authorizes_issued_token() {
        let gate = token_gate();
        let issued = gate.sessions().unwrap().issue(USERNAME).unwrap();

        let user = gate.check(&Presented::Bearer(issued.token)).unwrap();
        assert_eq!(user.username, USERNAME);
        assert_eq!(user.expires_at, Some(issued.expires_at));
    }

    #[test]
    fn token_gate_rejections() {
        let gate = token_gate();
        assert_eq!(gate.check(&Presented::Nothing), Err(AuthError::MissingToken));
        assert_eq!(
            gate.check(&basic(USERNAME, PASSWORD)),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            gate.check(&Presented::Bearer("garbage".into())),
            Err(AuthError::MalformedToken)
        );

        let foreign = SessionAuthority::new(b"someone-else").issue(USERNAME).unwrap();
        assert_eq!(
            gate.check(&Presented::Bearer(foreign.token)),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn presented_debug_hides_secrets() {
        let rendered = format!("{:?}", basic("alice", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        let rendered = format!("{:?}", Presented::Bearer("tok-secret".into()));
        assert!(!rendered.contains("tok-secret"));
    }
}
