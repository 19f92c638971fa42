use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use course_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller as seen by public routes: `None` for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Claims>);

/// Public routes: attach a `Viewer`. No header means anonymous, but a header
/// carrying a bad token is still rejected.
pub async fn identify(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(req.headers(), &state.jwt_secret)?;
    req.extensions_mut().insert(Viewer(claims));
    Ok(next.run(req).await)
}

/// Protected routes: extract and validate the JWT, attach its `Claims`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(req.headers(), &state.jwt_secret)?.ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Option<Claims>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    Ok(Some(token_data.claims))
}
