// Huawei ONT web UI adapters
//
// Every supported Huawei model logs in through `/login.cgi` and reports
// traffic on the same Ethernet info page, but the models disagree on
// where the login token comes from, which cookie proves the session and
// how the counters are written. Those differences live in a `Dialect`;
// `HuaweiModem` runs the shared session state machine over it.

pub(crate) mod eg8141a5;
pub(crate) mod eg8141a5v5;

mod client;
mod parse;
mod scrape;
mod token;

use std::future::Future;
use std::marker::PhantomData;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Operation};
use crate::model::{Counters, DeviceInfo};
use crate::modem::{Modem, ModemConfig};
use crate::session::{AuthToken, Session};
use client::WebUi;

const VENDOR: &str = "Huawei";
const LOGIN_PATH: &str = "/login.cgi";
/// Cookie the login page itself sends before any session exists.
const PLACEHOLDER_COOKIE: &str = "Cookie=body:Language:english:id=-1";
const TOKEN_FIELD: &str = "x.X_HW_Token";

/// The per-model half of the protocol.
pub(crate) trait Dialect: Send + Sync + 'static {
    const MODEL: &'static str;

    /// Value of the `Language` login field, for firmware that wants one.
    const LANGUAGE: Option<&'static str>;

    /// Fetch a fresh login token.
    fn fetch_token(
        web: &WebUi,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<AuthToken, Error>> + Send;

    /// Pull the session cookie out of a successful login response.
    fn session_cookie(headers: &HeaderMap) -> Option<String>;

    /// Turn the stat page's marker line into counters.
    fn parse(line: &str) -> Result<Counters, Error>;
}

/// Adapter for one Huawei device speaking dialect `D`.
///
/// The session mutex is held for the whole authenticate-and-read
/// sequence, so concurrent scrapes of the same device queue up instead
/// of racing two logins against each other.
pub(crate) struct HuaweiModem<D> {
    web: WebUi,
    session: Mutex<Session>,
    info: DeviceInfo,
    dialect: PhantomData<fn() -> D>,
}

impl<D: Dialect> HuaweiModem<D> {
    pub(crate) fn new(config: ModemConfig) -> Result<Self, Error> {
        Ok(Self {
            web: WebUi::new(config)?,
            session: Mutex::new(Session::new()),
            info: DeviceInfo::new(VENDOR, D::MODEL),
            dialect: PhantomData,
        })
    }

    pub(crate) fn boxed(config: ModemConfig) -> Result<Box<dyn Modem>, Error> {
        Ok(Box::new(Self::new(config)?))
    }

    /// One full read: fetch the stat line, re-authenticating and retrying
    /// exactly once if the device rejects the session, then parse it.
    async fn read(&self, cancel: &CancellationToken) -> Result<Counters, Error> {
        let mut session = self.session.lock().await;

        let line = match self.fetch_stat_line(&mut session, false, cancel).await {
            Err(err) if err.is_need_auth() => {
                info!(model = D::MODEL, "session rejected, re-authenticating");
                self.fetch_stat_line(&mut session, true, cancel).await?
            }
            other => other?,
        };

        D::parse(&line).map_err(|e| e.context(Operation::Parse))
    }

    async fn fetch_stat_line(
        &self,
        session: &mut Session,
        is_retry: bool,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        if is_retry || !session.is_authenticated() {
            let cookie = self
                .login(cancel)
                .await
                .map_err(|e| e.context(Operation::Login))?;
            session.replace(cookie);
        }

        scrape::fetch_stat_line(&self.web, session.cookie(), is_retry, cancel)
            .await
            .map_err(|e| e.context(Operation::StatFetch))
    }

    /// Log in with a fresh token. Touches no state: the caller stores the
    /// returned cookie only once the whole exchange has succeeded.
    async fn login(&self, cancel: &CancellationToken) -> Result<SecretString, Error> {
        let token = D::fetch_token(&self.web, cancel)
            .await
            .map_err(|e| e.context(Operation::TokenFetch))?
            .into_inner();
        let password = URL_SAFE.encode(self.web.password().expose_secret());

        // Keys in sorted order, matching what the web UI's own form posts.
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(4);
        if let Some(language) = D::LANGUAGE {
            form.push(("Language", language));
        }
        form.push(("PassWord", password.as_str()));
        form.push(("UserName", self.web.username()));
        form.push((TOKEN_FIELD, token.as_str()));

        debug!(model = D::MODEL, user = self.web.username(), "logging in");
        let page = self
            .web
            .post_form(LOGIN_PATH, PLACEHOLDER_COOKIE, Some(&form), cancel)
            .await?;

        if page.status != StatusCode::OK {
            return Err(Error::LoginRejected {
                status: page.status.as_u16(),
            });
        }

        let cookie = D::session_cookie(&page.headers).ok_or(Error::NoSessionCookie)?;
        debug!(model = D::MODEL, "login successful");
        Ok(SecretString::from(cookie))
    }
}

impl<D: Dialect> Modem for HuaweiModem<D> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn read_counters<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Counters, Error>> {
        self.read(cancel).boxed()
    }
}
