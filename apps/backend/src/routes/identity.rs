//! Identity middleware
//!
//! Sessions are handled upstream; the identity layer forwards the
//! authenticated user id in the `X-User-Id` header.

use axum::{body::Body, extract::Request, http::HeaderName, middleware::Next, response::Response};

use crate::error::{ApiError, Result};

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

const MAX_USER_ID_LEN: usize = 128;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Identity middleware - extracts the user id forwarded by the identity layer
pub async fn identity_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let user_id = request
        .headers()
        .get(&USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?
        .to_string();

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(ApiError::Unauthorized("User id too long".to_string()));
    }

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
