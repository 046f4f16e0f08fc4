use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "reelmarks_user";

/// Identity asserted by the external provider, surfaced to handlers via the
/// session cookie. Absent means a signed-out visitor.
pub struct CurrentUser(pub Option<String>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(Self(user))
    }
}

pub fn session_cookie(user_id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .build()
}

// Removal cookie; path must match the one the session cookie was set with.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, header};

    use super::*;

    async fn extract(cookie_header: Option<&str>) -> Option<String> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = cookie_header {
            builder = builder.header(header::COOKIE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let CurrentUser(user) =
            <CurrentUser as FromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        user
    }

    #[tokio::test]
    async fn reads_identity_from_session_cookie() {
        assert_eq!(extract(Some("reelmarks_user=alice")).await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn absent_or_blank_cookie_means_signed_out() {
        assert_eq!(extract(None).await, None);
        assert_eq!(extract(Some("reelmarks_user=")).await, None);
        assert_eq!(extract(Some("other=1")).await, None);
    }
}
