//! Huawei EG8141A5: token from the root page script, every `Set-Cookie`
//! pair forms the session, counters as five quoted decimal fields.

use std::future::Future;

use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;

use super::client::WebUi;
use super::{Dialect, HuaweiModem, VENDOR, parse, token};
use crate::error::Error;
use crate::model::Counters;
use crate::registry::Registration;
use crate::session::{AuthToken, join_set_cookies};

pub(crate) struct Eg8141a5;

pub(crate) const REGISTRATION: Registration = Registration {
    vendor: VENDOR,
    model: Eg8141a5::MODEL,
    build: HuaweiModem::<Eg8141a5>::boxed,
};

impl Dialect for Eg8141a5 {
    const MODEL: &'static str = "EG8141A5";
    const LANGUAGE: Option<&'static str> = None;

    fn fetch_token(
        web: &WebUi,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<AuthToken, Error>> + Send {
        token::fetch_script_token(web, cancel)
    }

    fn session_cookie(headers: &HeaderMap) -> Option<String> {
        join_set_cookies(headers)
    }

    fn parse(line: &str) -> Result<Counters, Error> {
        parse::parse_five_field(line)
    }
}
