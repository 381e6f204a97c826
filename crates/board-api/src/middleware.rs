use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::AppState;
use crate::token::{AuthUser, TokenIssuer};

/// Cookie holding the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Where the gate sends requests it cannot authenticate.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated(AuthUser),
}

impl Session {
    pub fn from_cookies(jar: &CookieJar, tokens: &TokenIssuer) -> Self {
        let Some(cookie) = jar.get(TOKEN_COOKIE) else {
            debug!("No session cookie");
            return Self::Unauthenticated;
        };

        match tokens.verify(cookie.value()) {
            Ok(user) => Self::Authenticated(user),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                Self::Unauthenticated
            }
        }
    }
}

/// Verify the session cookie and hand the caller's identity to the handler
/// as an `Extension<AuthUser>`. Unauthenticated requests are redirected to
/// the login page.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match Session::from_cookies(&jar, &state.tokens) {
        Session::Authenticated(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Session::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use chrono::Duration;
    use uuid::Uuid;

    fn tokens() -> TokenIssuer {
        TokenIssuer::new("gate-secret", Duration::hours(1))
    }

    #[test]
    fn missing_cookie_is_unauthenticated() {
        let jar = CookieJar::new();
        assert_eq!(Session::from_cookies(&jar, &tokens()), Session::Unauthenticated);
    }

    #[test]
    fn valid_cookie_is_authenticated() {
        let tokens = tokens();
        let id = Uuid::new_v4();
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, tokens.issue(id, "bob").unwrap()));

        assert_eq!(
            Session::from_cookies(&jar, &tokens),
            Session::Authenticated(AuthUser { id, username: "bob".into() })
        );
    }

    #[test]
    fn expired_cookie_is_unauthenticated() {
        let expired = TokenIssuer::new("gate-secret", Duration::hours(-1));
        let jar = CookieJar::new().add(Cookie::new(
            TOKEN_COOKIE,
            expired.issue(Uuid::new_v4(), "bob").unwrap(),
        ));

        assert_eq!(Session::from_cookies(&jar, &tokens()), Session::Unauthenticated);
    }
}
