//! Cookie-backed session markers.
//!
//! The session is two plain cookies: `auth=1` gates the pages and `user`
//! carries the display name shown in the header.

use axum::http::{header, HeaderMap, HeaderValue};
use inventory_core::encoding::{decode_component, encode_component};
use inventory_core::models::{AUTH_COOKIE, COOKIE_PATH, USER_COOKIE};

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub max_age_secs: u64,
    pub secure: bool,
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            Some((name.trim(), value.trim()))
        })
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    cookie_pairs(headers).find(|(n, _)| *n == name).map(|(_, v)| v)
}

pub fn has_session(headers: &HeaderMap) -> bool {
    cookie_value(headers, AUTH_COOKIE).is_some()
}

pub fn username(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, USER_COOKIE)
        .and_then(decode_component)
        .filter(|name| !name.is_empty())
}

fn set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; SameSite=Lax",
        name, value, COOKIE_PATH, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn login_cookies(username: &str, options: CookieOptions) -> [String; 2] {
    [
        set_cookie(AUTH_COOKIE, "1", options.max_age_secs, options.secure),
        set_cookie(
            USER_COOKIE,
            &encode_component(username),
            options.max_age_secs,
            options.secure,
        ),
    ]
}

pub fn logout_cookies(options: CookieOptions) -> [String; 2] {
    [
        set_cookie(AUTH_COOKIE, "", 0, options.secure),
        set_cookie(USER_COOKIE, "", 0, options.secure),
    ]
}

/// Appends `Set-Cookie` headers, skipping any value that is not a valid header.
pub fn append_cookies(headers: &mut HeaderMap, cookies: &[String]) {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: CookieOptions = CookieOptions {
        max_age_secs: 28_800,
        secure: false,
    };

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_has_session() {
        assert!(has_session(&headers_with("theme=dark; auth=1")));
        assert!(!has_session(&headers_with("theme=dark; author=x")));
        assert!(!has_session(&HeaderMap::new()));
    }

    #[test]
    fn test_username_is_decoded() {
        let headers = headers_with("auth=1; user=Priya%20Nair");
        assert_eq!(username(&headers).as_deref(), Some("Priya Nair"));
        assert_eq!(username(&headers_with("auth=1; user=%E0%A4")), None);
        assert_eq!(username(&headers_with("auth=1")), None);
    }

    #[test]
    fn test_login_cookies() {
        let [auth, user] = login_cookies("Priya Nair", OPTIONS);
        assert_eq!(auth, "auth=1; Path=/; Max-Age=28800; SameSite=Lax");
        assert_eq!(user, "user=Priya%20Nair; Path=/; Max-Age=28800; SameSite=Lax");
    }

    #[test]
    fn test_logout_and_secure_flag() {
        let [auth, user] = logout_cookies(CookieOptions { secure: true, ..OPTIONS });
        assert_eq!(auth, "auth=; Path=/; Max-Age=0; SameSite=Lax; Secure");
        assert!(user.starts_with("user=; Path=/; Max-Age=0"));
    }
}
