use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Constant-time string comparison, for API keys and other secrets.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Outcome of checking a request against the admin API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCheck {
    Granted,
    MissingToken,
    InvalidToken,
}

/// Check the request's bearer token against `api_key`.
///
/// With no key configured every token is rejected.
pub fn check_admin(api_key: Option<&str>, headers: &HeaderMap) -> AuthCheck {
    let Some(token) = bearer_token(headers) else {
        return AuthCheck::MissingToken;
    };

    match api_key {
        Some(expected) if constant_time_compare(token, expected) => AuthCheck::Granted,
        _ => AuthCheck::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_check_admin() {
        let headers = headers_with("Bearer admin-key");

        assert_eq!(check_admin(Some("admin-key"), &headers), AuthCheck::Granted);
        assert_eq!(check_admin(Some("other-key"), &headers), AuthCheck::InvalidToken);
        assert_eq!(
            check_admin(Some("admin-key"), &HeaderMap::new()),
            AuthCheck::MissingToken
        );
    }

    #[test]
    fn test_check_admin_without_configured_key() {
        let headers = headers_with("Bearer anything");
        assert_eq!(check_admin(None, &headers), AuthCheck::InvalidToken);
    }
}
