use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{AuthError, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated company context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthCompany {
    pub company_id: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for AuthCompany {
    fn from(claims: Claims) -> Self {
        Self {
            expires_at: claims.expires_at(),
            company_id: claims.sub,
            token_id: claims.jti,
        }
    }
}

impl AuthCompany {
    /// Tokens are scoped to one company; any other company id is forbidden.
    pub fn ensure_company(&self, company_id: &str) -> Result<(), ApiError> {
        if self.company_id == company_id {
            Ok(())
        } else {
            tracing::warn!(
                "Token for company '{}' tried to access company '{}'",
                self.company_id,
                company_id
            );
            Err(ApiError::forbidden("Token is not valid for this company"))
        }
    }
}

/// Bearer authentication: verifies the JWT, rejects revoked token ids and
/// companies that are unknown or signed out, then injects [`AuthCompany`]
/// into the request.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::from(e)
    })?;

    if state.revocations.is_revoked(claims.jti, Utc::now()).await? {
        tracing::warn!("Rejected revoked token {} for company {}", claims.jti, claims.sub);
        return Err(AuthError::Revoked.into());
    }

    let active = state
        .companies
        .find(&claims.sub)
        .await?
        .is_some_and(|company| company.is_active);
    if !active {
        tracing::warn!("Rejected token {} for inactive company {}", claims.jti, claims.sub);
        return Err(AuthError::InactiveCompany.into());
    }

    request.extensions_mut().insert(AuthCompany::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_jwt_from_headers(&headers("Bearer  ")), Err("Empty JWT token"));
        assert!(extract_jwt_from_headers(&headers("Basic xyz")).is_err());
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
    }

    #[test]
    fn company_scope_is_enforced() {
        let auth = AuthCompany {
            company_id: "acme".into(),
            token_id: Uuid::new_v4(),
            expires_at: Utc::now(),
        };
        assert!(auth.ensure_company("acme").is_ok());
        assert_eq!(auth.ensure_company("globex").unwrap_err().status_code(), 403);
    }
}
