use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthError, Role, TokenService};
use crate::error::ApiError;

/// Identity established by a role gate, available to handlers as an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthSubject {
    pub id: Uuid,
    pub role: Role,
}

/// State for one route group's gate.
#[derive(Clone)]
pub struct RoleGate {
    pub tokens: Arc<TokenService>,
    pub role: Role,
}

/// Admits the request only with a valid, unexpired token for exactly
/// `gate.role`, signed with that role's secret.
pub async fn require_role(
    State(gate): State<RoleGate>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)?;
    let claims = gate.tokens.verify(token, gate.role)?;

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::MalformedToken("subject is not a valid id".to_string()))?;

    tracing::debug!("Authenticated {} {} for {}", claims.role, id, request.uri().path());
    request.extensions_mut().insert(AuthSubject { id, role: claims.role });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedToken("invalid Authorization header".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AuthError::MissingToken),
        None => Err(AuthError::MalformedToken(
            "Authorization header must use Bearer token format".to_string(),
        )),
    }
}
