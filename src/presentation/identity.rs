// Caller identity forwarded by the upstream auth proxy
use crate::domain::household::User;
use crate::presentation::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

pub struct Caller(pub User);

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match (read(USER_ID_HEADER), read(USER_EMAIL_HEADER)) {
            (Some(uid), Some(email)) => Ok(Caller(User::new(uid, email))),
            _ => Err(ApiError::Unauthenticated),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_requires_both_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u1"));
        assert!(Caller::from_headers(&headers).is_err());

        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("a@b.c"));
        let Caller(user) = Caller::from_headers(&headers).unwrap();
        assert_eq!(user, User::new("u1", "a@b.c"));
    }
}
