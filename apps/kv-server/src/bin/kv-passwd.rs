// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Produce a user registry entry.
//!
//! ```text
//! echo -n 'secret' | kv-passwd admin [--cost 12] >> users.yml
//! ```
//!
//! Reads the password from the first line of stdin and prints a YAML list
//! item suitable for the `users:` section of the registry file.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

use relational_kv_server::auth::{hash_password, UserEntry, DEFAULT_HASH_COST};

/// Hash a password into a kv user registry entry.
#[derive(Debug, Parser, PartialEq, Eq)]
#[command(name = "kv-passwd")]
#[command(version, about, long_about = None)]
struct Options {
    /// Username of the registry entry
    #[arg(default_value = "admin")]
    username: String,

    /// bcrypt cost factor
    #[arg(long, default_value_t = DEFAULT_HASH_COST)]
    cost: u32,
}

fn read_password(input: impl BufRead) -> Result<String, String> {
    let line = input
        .lines()
        .next()
        .transpose()
        .map_err(|e| format!("failed to read password: {e}"))?
        .unwrap_or_default();
    if line.is_empty() {
        return Err("empty password".to_string());
    }
    Ok(line)
}

fn render_entry(options: &Options, password: &str) -> Result<String, String> {
    let password_hash =
        hash_password(password, options.cost).map_err(|e| format!("hashing failed: {e}"))?;
    let entry = UserEntry {
        username: options.username.clone(),
        password_hash,
    };
    serde_yaml::to_string(&[entry]).map_err(|e| format!("failed to render entry: {e}"))
}

fn run() -> Result<(), String> {
    let options = Options::parse();
    let password = read_password(io::stdin().lock())?;
    let rendered = render_entry(&options, &password)?;

    io::stdout()
        .write_all(rendered.as_bytes())
        .map_err(|e| format!("failed to write entry: {e}"))
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kv-passwd: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relational_kv_server::auth::{CredentialVerifier, UserRegistry};

    #[test]
    fn defaults_to_admin() {
        let options = Options::try_parse_from(["kv-passwd"]).unwrap();
        assert_eq!(options.username, "admin");
        assert_eq!(options.cost, DEFAULT_HASH_COST);
    }

    #[test]
    fn parses_username_and_cost() {
        let options = Options::try_parse_from(["kv-passwd", "bob", "--cost", "5"]).unwrap();
        assert_eq!(
            options,
            Options {
                username: "bob".into(),
                cost: 5
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Options::try_parse_from(["kv-passwd", "--cost"]).is_err());
        assert!(Options::try_parse_from(["kv-passwd", "--cost", "many"]).is_err());
        assert!(Options::try_parse_from(["kv-passwd", "--verbose"]).is_err());
        assert!(Options::try_parse_from(["kv-passwd", "a", "b"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Options::command().debug_assert();
    }

    #[test]
    fn password_is_first_line_without_newline() {
        let password = read_password("hunter2\nignored\n".as_bytes()).unwrap();
        assert_eq!(password, "hunter2");
        assert!(read_password("".as_bytes()).is_err());
    }

    #[test]
    fn rendered_entry_loads_and_verifies() {
        let options = Options {
            username: "bob".into(),
            cost: 4,
        };
        let rendered = render_entry(&options, "hunter2").unwrap();
        assert!(rendered.contains("passwordHash"));

        let registry = UserRegistry::from_yaml(&format!("users:\n{rendered}")).unwrap();
        let verifier = CredentialVerifier::new(registry).unwrap();
        assert!(verifier.verify("bob", "hunter2"));
        assert!(!verifier.verify("bob", "hunter3"));
    }
}
