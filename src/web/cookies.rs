use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use cookie::{Cookie, SameSite};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

pub fn session_cookies(access_token: &str, refresh_token: &str, secure: bool) -> Vec<Cookie<'static>> {
    vec![
        base_cookie(ACCESS_COOKIE, access_token.to_string(), secure),
        base_cookie(REFRESH_COOKIE, refresh_token.to_string(), secure),
    ]
}

pub fn cleared_cookies(secure: bool) -> Vec<Cookie<'static>> {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = base_cookie(name, String::new(), secure);
            cookie.make_removal();
            cookie
        })
        .collect()
}

pub fn append_cookies(response: &mut Response, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(cookie = cookie.name(), "cannot encode cookie: {}", e),
        }
    }
}

/// Whether `response` already sets the access or refresh cookie.
pub fn sets_auth_cookie(response: &Response) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw).ok())
        .any(|c| c.name() == ACCESS_COOKIE || c.name() == REFRESH_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; refresh_token=r1"),
        );
        assert_eq!(read_cookie(&headers, ACCESS_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE).as_deref(), Some("r1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cleared_cookies_expire_both_tokens() {
        let cleared = cleared_cookies(false);
        assert_eq!(cleared.len(), 2);
        for c in cleared {
            let rendered = c.to_string();
            assert!(rendered.contains("Max-Age=0"), "{}", rendered);
            assert!(rendered.contains("HttpOnly"));
        }
    }

    #[test]
    fn detects_auth_cookies_already_on_the_response() {
        let mut response = Response::new(axum::body::Body::empty());
        assert!(!sets_auth_cookie(&response));
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));
        assert!(!sets_auth_cookie(&response));
        append_cookies(&mut response, &cleared_cookies(false));
        assert!(sets_auth_cookie(&response));
    }
}
