use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtle::ConstantTimeEq;

pub enum AuthError {
    MissingSecret,
    InvalidSecret,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, reason) = match self {
            AuthError::MissingSecret => (StatusCode::UNAUTHORIZED, "Missing admin secret"),
            AuthError::InvalidSecret => (StatusCode::UNAUTHORIZED, "Invalid admin secret"),
        };
        (
            status,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}

fn extract_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(secret) = headers.get("x-admin-secret").and_then(|v| v.to_str().ok()) {
        return Some(secret);
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Single shared admin secret, compared in constant time.
pub fn require_admin(expected: &str, headers: &HeaderMap) -> Result<(), AuthError> {
    match extract_secret(headers) {
        Some(secret) => {
            if secret.as_bytes().ct_eq(expected.as_bytes()).into() {
                Ok(())
            } else {
                Err(AuthError::InvalidSecret)
            }
        }
        None => Err(AuthError::MissingSecret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_header_and_bearer_forms() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-secret", HeaderValue::from_static("s3cret"));
        assert!(require_admin("s3cret", &headers).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer s3cret"),
        );
        assert!(require_admin("s3cret", &headers).is_ok());
    }

    #[test]
    fn rejects_missing_and_wrong_secret() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_admin("s3cret", &headers),
            Err(AuthError::MissingSecret)
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-admin-secret", HeaderValue::from_static("nope"));
        assert!(matches!(
            require_admin("s3cret", &headers),
            Err(AuthError::InvalidSecret)
        ));
    }
}
