// Login token fetchers
//
// The web UI refuses a login without a fresh anti-forgery token tied to
// the anonymous session. Older firmware embeds it in a script on the
// root page; newer firmware serves it from a dedicated endpoint.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use super::PLACEHOLDER_COOKIE;
use super::client::WebUi;
use crate::error::Error;
use crate::session::AuthToken;

const TOKEN_FUNCTION: &str = "function GetRandCnt()";
const TOKEN_PATH: &str = "/asp/GetRandCount.asp";
/// Bytes the token endpoint emits ahead of the token itself.
const TOKEN_PREFIX_LEN: usize = 3;

static RETURN_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return '([^']+)").expect("static regex"));

/// Fetch the token from the script literal on the device root page.
pub(crate) async fn fetch_script_token(
    web: &WebUi,
    cancel: &CancellationToken,
) -> Result<AuthToken, Error> {
    let page = web.get_root(cancel).await?;
    if page.status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            status: page.status.as_u16(),
        });
    }
    extract_script_token(&page.text())
}

/// Fetch the token from the dedicated token endpoint.
pub(crate) async fn fetch_endpoint_token(
    web: &WebUi,
    cancel: &CancellationToken,
) -> Result<AuthToken, Error> {
    let page = web
        .post_form(TOKEN_PATH, PLACEHOLDER_COOKIE, None, cancel)
        .await?;
    if page.status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            status: page.status.as_u16(),
        });
    }
    extract_endpoint_token(&page.body)
}

/// Scan `body` line by line for the token function and pull the quoted
/// string it returns. The first line that yields a token wins.
pub(crate) fn extract_script_token(body: &str) -> Result<AuthToken, Error> {
    body.lines()
        .filter(|line| line.contains(TOKEN_FUNCTION))
        .find_map(|line| RETURN_LITERAL.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| AuthToken::new(m.as_str()))
        .ok_or(Error::TokenNotFound)
}

/// Drop the fixed-width prefix; the rest of the body is the token verbatim.
pub(crate) fn extract_endpoint_token(body: &[u8]) -> Result<AuthToken, Error> {
    let token = body
        .get(TOKEN_PREFIX_LEN..)
        .filter(|rest| !rest.is_empty())
        .ok_or(Error::TokenNotFound)?;
    let token = std::str::from_utf8(token).map_err(|_| Error::TokenNotFound)?;
    Ok(AuthToken::new(token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn script_token_from_function_line() {
        let body = "<html>\n<script>\nfunction GetRandCnt(){ return 'abcd1234'; }\n</script>";
        assert_eq!(extract_script_token(body).unwrap().as_str(), "abcd1234");
    }

    #[test]
    fn script_token_ignores_returns_outside_the_function() {
        let body = "function other(){ return 'nope'; }\nfunction GetRandCnt(){ return 'yes'; }";
        assert_eq!(extract_script_token(body).unwrap().as_str(), "yes");
    }

    #[test]
    fn script_token_first_match_wins() {
        let body = "function GetRandCnt(){ return 'first'; }\nfunction GetRandCnt(){ return 'second'; }";
        assert_eq!(extract_script_token(body).unwrap().as_str(), "first");
    }

    #[test]
    fn script_token_missing() {
        let body = "<html><body>login</body></html>";
        assert!(matches!(
            extract_script_token(body),
            Err(Error::TokenNotFound)
        ));
    }

    #[test]
    fn script_token_signature_without_literal() {
        let body = "function GetRandCnt() {\n  return token;\n}";
        assert!(matches!(
            extract_script_token(body),
            Err(Error::TokenNotFound)
        ));
    }

    #[test]
    fn endpoint_token_strips_prefix() {
        let body = b"\xEF\xBB\xBF7f3a9c01e2";
        assert_eq!(extract_endpoint_token(body).unwrap().as_str(), "7f3a9c01e2");
    }

    #[test]
    fn endpoint_token_too_short() {
        assert!(matches!(
            extract_endpoint_token(b"\xEF\xBB"),
            Err(Error::TokenNotFound)
        ));
        assert!(matches!(
            extract_endpoint_token(b"\xEF\xBB\xBF"),
            Err(Error::TokenNotFound)
        ));
    }
}
