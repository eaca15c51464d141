// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain access endpoint.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::{get_domain_access_for_user, get_grpc_metadata_from_auth, Auth, DomainAccess};
use crate::state::AppState;

/// Get the caller's read/write access to a domain.
///
/// With RBAC disabled the domain is not looked up. A failed lookup denies
/// access rather than erroring.
#[utoipa::path(
    get,
    path = "/api/domains/{domain}/access",
    tag = "Domains",
    params(("domain" = String, Path, description = "Domain name")),
    responses(
        (status = 200, description = "Access decision", body = DomainAccess),
        (status = 500, description = "Configuration source unavailable"),
    )
)]
pub async fn get_domain_access(
    Auth(ctx): Auth,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Json<DomainAccess> {
    if !ctx.rbac_enabled {
        return Json(DomainAccess::FULL);
    }

    let metadata = get_grpc_metadata_from_auth(Some(&ctx));
    match state.domains.describe_domain(&domain, metadata.as_ref()).await {
        Ok(description) => Json(get_domain_access_for_user(&description, &ctx)),
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "Domain lookup failed, denying access");
            Json(DomainAccess::NONE)
        }
    }
}
