// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction for the server.
//!
//! Authentication is performed by whatever sits in front of this server.
//! The upstream proxy forwards the caller's identity in two headers:
//!
//! - `X-Actor-Id`: an opaque identifier used for logging
//! - `X-Actor-Role`: `admin` or `member`

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use cabin_rotation_api::{AuthenticatedActor, Role};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::ErrorResponse;

/// Header carrying the caller's identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the calling actor.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     RequestActor(actor): RequestActor,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects the request with HTTP 401 if either header is missing, is not
/// valid UTF-8, or names an unknown role.
pub struct RequestActor(pub AuthenticatedActor);

impl<S: Send + Sync> FromRequestParts<S> for RequestActor {
    type Rejection = ActorError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id: String = header_value(parts, ACTOR_ID_HEADER)?;
        let role_str: String = header_value(parts, ACTOR_ROLE_HEADER)?;

        let role: Role = Role::from_str(&role_str).map_err(|e| {
            warn!(actor = %id, role = %role_str, "Unknown actor role");
            ActorError::InvalidRole(e.to_string())
        })?;

        debug!(actor = %id, role = role.as_str(), "Actor extracted");

        Ok(Self(AuthenticatedActor::new(id, role)))
    }
}

fn header_value(parts: &Parts, name: &'static str) -> Result<String, ActorError> {
    let value: &str = parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing actor header");
            ActorError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid actor header encoding");
            ActorError::InvalidHeader(name)
        })?;

    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(ActorError::MissingHeader(name));
    }
    Ok(trimmed.to_string())
}

/// Actor extraction errors.
///
/// These errors are automatically converted to HTTP responses.
#[derive(Debug)]
pub enum ActorError {
    /// A required header is missing or empty.
    MissingHeader(&'static str),
    /// A header is not valid UTF-8.
    InvalidHeader(&'static str),
    /// The role header names an unknown role.
    InvalidRole(String),
}

impl IntoResponse for ActorError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingHeader(name) => format!("Missing {name} header"),
            Self::InvalidHeader(name) => format!("Invalid {name} header encoding"),
            Self::InvalidRole(reason) => reason,
        };

        (
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse {
                error: true,
                message,
                retryable: false,
            }),
        )
            .into_response()
    }
}
