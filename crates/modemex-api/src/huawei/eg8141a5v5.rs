//! Huawei EG8141A5 V5 firmware: token from `/asp/GetRandCount.asp`, the
//! first `Set-Cookie` segment is the session, counters split into 32-bit
//! halves.

use std::future::Future;

use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;

use super::client::WebUi;
use super::{Dialect, HuaweiModem, VENDOR, parse, token};
use crate::error::Error;
use crate::model::Counters;
use crate::registry::Registration;
use crate::session::{AuthToken, first_set_cookie};

pub(crate) struct Eg8141a5v5;

pub(crate) const REGISTRATION: Registration = Registration {
    vendor: VENDOR,
    model: Eg8141a5v5::MODEL,
    build: HuaweiModem::<Eg8141a5v5>::boxed,
};

impl Dialect for Eg8141a5v5 {
    const MODEL: &'static str = "EG8141A5V5";
    const LANGUAGE: Option<&'static str> = Some("english");

    fn fetch_token(
        web: &WebUi,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<AuthToken, Error>> + Send {
        token::fetch_endpoint_token(web, cancel)
    }

    fn session_cookie(headers: &HeaderMap) -> Option<String> {
        first_set_cookie(headers)
    }

    fn parse(line: &str) -> Result<Counters, Error> {
        parse::parse_variadic(line)
    }
}
