// Session credential state and cookie extraction.
//
// The credential is whatever the device set on a successful login,
// serialized as a `Cookie` header value. It is only ever replaced by a
// successful login; a rejected session is detected reactively when the
// stat page refuses it.

use reqwest::header::{HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};

/// Per-adapter session state.
#[derive(Debug, Default)]
pub struct Session {
    cookie: Option<SecretString>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a credential is held. Says nothing about whether the device
    /// still accepts it.
    pub fn is_authenticated(&self) -> bool {
        self.cookie.is_some()
    }

    /// The held credential as a `Cookie` header value.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_ref().map(|c| c.expose_secret())
    }

    /// Replace any previously held credential.
    pub fn replace(&mut self, cookie: SecretString) {
        self.cookie = Some(cookie);
    }
}

/// A one-time anti-forgery token, consumed by the login it was fetched for.
#[derive(Debug)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Every `Set-Cookie` name=value pair, joined with `"; "`.
pub fn join_set_cookies(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(cookie_pair)
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// The first `;`-delimited segment of the first `Set-Cookie` header.
pub fn first_set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(cookie_pair)
        .map(str::to_owned)
}

fn cookie_pair(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?.trim();
    let (name, _) = pair.split_once('=')?;
    if name.trim().is_empty() {
        None
    } else {
        Some(pair)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(SET_COOKIE, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn join_collects_every_pair() {
        let map = headers(&["SID=abc; path=/; HttpOnly", "lang=en; path=/"]);
        assert_eq!(join_set_cookies(&map).as_deref(), Some("SID=abc; lang=en"));
    }

    #[test]
    fn join_skips_nameless_entries() {
        let map = headers(&["=orphan", "SID=abc"]);
        assert_eq!(join_set_cookies(&map).as_deref(), Some("SID=abc"));
    }

    #[test]
    fn first_takes_leading_segment_only() {
        let map = headers(&[
            "Cookie=sid=0a1b2c:Language:english:id=1;path=/;HttpOnly",
            "other=1",
        ]);
        assert_eq!(
            first_set_cookie(&map).as_deref(),
            Some("Cookie=sid=0a1b2c:Language:english:id=1")
        );
    }

    #[test]
    fn missing_header_yields_none() {
        let map = HeaderMap::new();
        assert!(join_set_cookies(&map).is_none());
        assert!(first_set_cookie(&map).is_none());
    }

    #[test]
    fn replace_overwrites_previous_cookie() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        session.replace(SecretString::from("SID=old".to_owned()));
        session.replace(SecretString::from("SID=new".to_owned()));

        assert_eq!(session.cookie(), Some("SID=new"));
    }
}
