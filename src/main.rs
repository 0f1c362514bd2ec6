// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use oidc_gatekeeper::{
    api::router,
    config::Settings,
    state::AppState,
    telemetry::init_tracing,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    init_tracing(
        settings
            .as_ref()
            .map(|settings| settings.log_format)
            .unwrap_or_default(),
    );

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let state = match AppState::from_settings(&settings) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize key source");
            std::process::exit(1);
        }
    };

    // Keys are fetched on demand anyway; this only avoids a slow first request.
    if let Err(e) = state.jwks().refresh().await {
        warn!(error = %e, "JWKS warm-up failed, continuing");
    }

    let addr = settings.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(
        %addr,
        issuer = %settings.issuer,
        "OIDC gatekeeper listening"
    );

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
