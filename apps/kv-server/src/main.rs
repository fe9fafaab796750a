// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, process::ExitCode, sync::Arc};

use axum_server::tls_rustls::RustlsConfig;
use relational_kv_server::{
    api::router,
    auth::{AccessGate, CredentialVerifier, SessionAuthority, UserRegistry},
    config::{AppConfig, AuthMode, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{build_codec, Store},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn Error>> {
    tracing::debug!(?config, "Loaded configuration");

    // Storage: one codec for the lifetime of the process
    let codec = build_codec(config.storage_format, config.encryption_key.as_deref())?;
    let store = Store::new(&config.data_file, codec);

    // Users and access gate
    let registry = UserRegistry::load(&config.users_file)?;
    if registry.is_empty() {
        tracing::warn!(
            users_file = %config.users_file.display(),
            "User registry is empty; every request will be rejected"
        );
    }
    let verifier = Arc::new(CredentialVerifier::new(registry)?);
    let gate = match config.auth_mode {
        AuthMode::Basic => AccessGate::basic(verifier),
        AuthMode::Token => {
            let secret = config
                .jwt_secret
                .as_deref()
                .ok_or("KV_JWT_SECRET is required for token auth mode")?;
            AccessGate::token(Arc::new(SessionAuthority::new(secret.as_bytes())), verifier)
        }
    };

    tracing::info!(
        data_file = %store.path().display(),
        storage_format = store.format(),
        auth_mode = gate.mode(),
        "Storage and access gate ready"
    );

    let app = router(AppState::new(store, gate));
    let addr: SocketAddr = config.bind_address().parse()?;

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "rustls crypto provider already installed")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            tracing::info!("Relational KV server listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("Relational KV server listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}
