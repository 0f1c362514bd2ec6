// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Readiness response with individual component status.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    /// JWKS (signing keys) status: "ok" or "unavailable".
    pub jwks: String,
}

/// Simple response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Keys are available if cached, or if a fetch succeeds now.
async fn check_jwks(state: &AppState) -> String {
    let jwks = state.jwks();
    if jwks.is_cached().await {
        return "ok".to_string();
    }
    match jwks.refresh().await {
        Ok(()) => "ok".to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 503 when tokens cannot currently be verified.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let jwks = check_jwks(&state).await;
    let ready = jwks == "ok";

    let response = ReadyResponse {
        status: if ready { "ok" } else { "degraded" }.to_string(),
        checks: ReadyChecks { jwks },
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
