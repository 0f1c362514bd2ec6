// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applies bearer authentication to a whole router subtree and stores the
//! resulting [`Identity`](super::Identity) in request extensions, where the
//! `Auth` extractor picks it up.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/v1/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Reject unauthenticated requests with 401, otherwise pass them on.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.authenticator.try_authenticate(request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
