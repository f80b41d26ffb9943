//! Browser client identity.
//!
//! Each browser carries an opaque `mc_client` cookie. It names the client's
//! live session guard and namespaces its durable storage; it is not itself a
//! credential. A request without a valid cookie is a new client and the
//! response issues one.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

pub const CLIENT_COOKIE_NAME: &str = "mc_client";
const CLIENT_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Client id taken from the cookie, or minted for this request.
#[derive(Debug, Clone, Copy)]
pub struct ClientId {
    pub id: Uuid,
    /// True when the id was minted here and the cookie must be set.
    pub fresh: bool,
}

impl ClientId {
    #[must_use]
    pub fn mint() -> Self {
        Self { id: Uuid::new_v4(), fresh: true }
    }

    /// Attach the client cookie to `response` if this id was just minted.
    pub fn attach(self, secure: bool, response: impl IntoResponse) -> Response {
        if !self.fresh {
            return response.into_response();
        }
        let cookie = Cookie::build((CLIENT_COOKIE_NAME, self.id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(Duration::days(CLIENT_COOKIE_MAX_AGE_DAYS));
        (CookieJar::new().add(cookie), response).into_response()
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let parsed = jar
            .get(CLIENT_COOKIE_NAME)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        Ok(match parsed {
            Some(id) => Self { id, fresh: false },
            None => Self::mint(),
        })
    }
}
