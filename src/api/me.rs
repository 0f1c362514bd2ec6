// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::{Auth, Identity};

/// Return the authenticated caller's identity.
pub async fn me(Auth(identity): Auth) -> Json<Identity> {
    Json(identity)
}
