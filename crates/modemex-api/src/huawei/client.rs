// Huawei web UI HTTP client
//
// Wraps `reqwest::Client` with URL construction against the device root,
// the cookie header the web UI expects, and cancellation of both the
// request and the body read.

use reqwest::header::{COOKIE, HeaderMap};
use reqwest::StatusCode;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::modem::ModemConfig;
use crate::transport::cancellable;

/// A fully read response: the body is pulled before the request is
/// considered finished, so cancellation covers it too.
pub(crate) struct Page {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: bytes::Bytes,
}

impl Page {
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Raw HTTP client for one device's web management UI.
pub(crate) struct WebUi {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl WebUi {
    pub fn new(config: ModemConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            username: config.username,
            password: config.password,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Build a URL for an absolute page path on the device.
    ///
    /// The configured base may carry a path prefix (reverse proxies); the
    /// page path is appended to it rather than replacing it.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// `GET` a page, optionally presenting a cookie.
    pub async fn get(
        &self,
        path: &str,
        cookie: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        self.fetch(self.url(path)?, cookie, cancel).await
    }

    /// `GET` the configured base URL itself, prefix and all, without a cookie.
    pub async fn get_root(&self, cancel: &CancellationToken) -> Result<Page, Error> {
        self.fetch(self.base_url.clone(), None, cancel).await
    }

    async fn fetch(
        &self,
        url: Url,
        cookie: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        debug!("GET {}", url);

        let mut builder = self.http.get(url);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder, cancel).await
    }

    /// `POST` a form (or an empty body) with the given cookie.
    pub async fn post_form(
        &self,
        path: &str,
        cookie: &str,
        form: Option<&[(&str, &str)]>,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let mut builder = self.http.post(url).header(COOKIE, cookie);
        if let Some(form) = form {
            builder = builder.form(form);
        }
        self.send(builder, cancel).await
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        let resp = cancellable(cancel, builder.send()).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = cancellable(cancel, resp.bytes()).await?;
        debug!(status = status.as_u16(), len = body.len(), "response received");
        Ok(Page {
            status,
            headers,
            body,
        })
    }
}
