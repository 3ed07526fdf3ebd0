use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw bearer string, kept alongside the verified claims so handlers
/// that call another service can forward the caller's credential.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Verifies the bearer token and stores the claims in request extensions.
/// Handlers read the authenticated user id from there and never from a
/// request body field. Missing header, malformed token, and bad signature
/// all collapse into the same 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or(ApiError::Unauthorized("Missing token"))?
        .to_string();

    let claims = state
        .signer
        .verify(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid token"))?;

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
