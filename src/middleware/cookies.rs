use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

const PKCE_COOKIE_NAME: &str = "__google_signin_pkce";
const STATE_COOKIE_NAME: &str = "__google_signin_state";

/// PKCE verifier + state cookies for the authorization request.
pub(super) fn pkce_cookies(
    code_verifier: &str,
    state: &str,
    secure: bool,
    auth_path: &str,
) -> (Cookie<'static>, Cookie<'static>) {
    (
        transient_cookie(PKCE_COOKIE_NAME, code_verifier, secure, auth_path),
        transient_cookie(STATE_COOKIE_NAME, state, secure, auth_path),
    )
}

fn transient_cookie(name: &'static str, value: &str, secure: bool, path: &str) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(path.to_string())
        .max_age(Duration::minutes(5))
        .build()
}

/// Removal cookies for PKCE verifier + state.
pub(super) fn clear_pkce_cookies(auth_path: &str) -> (Cookie<'static>, Cookie<'static>) {
    let removal = |name: &'static str| {
        Cookie::build((name, ""))
            .path(auth_path.to_string())
            .max_age(Duration::ZERO)
            .build()
    };
    (removal(PKCE_COOKIE_NAME), removal(STATE_COOKIE_NAME))
}

/// Session cookie carrying the serialized session claims.
pub(super) fn session_cookie(
    name: &str,
    payload: String,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), payload))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build()
}

pub(super) fn get_pkce_verifier(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(PKCE_COOKIE_NAME).map(|c| c.value().to_string())
}

pub(super) fn get_state(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME).map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("sid", "{}".into(), 14, true);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(14)));
    }

    #[test]
    fn pkce_cookies_are_scoped_and_short_lived() {
        let (verifier, state) = pkce_cookies("v", "s", false, "/api/account");
        for cookie in [&verifier, &state] {
            assert_eq!(cookie.path(), Some("/api/account"));
            assert_eq!(cookie.max_age(), Some(Duration::minutes(5)));
            assert_eq!(cookie.secure(), Some(false));
        }
        assert_eq!(verifier.value(), "v");
        assert_eq!(state.value(), "s");
    }

    #[test]
    fn clearing_cookies_expire_immediately() {
        let (a, b) = clear_pkce_cookies("/api/account");
        assert_eq!(a.max_age(), Some(Duration::ZERO));
        assert_eq!(b.name(), STATE_COOKIE_NAME);
    }
}
