// Diagnostics page scraper
//
// Pulls the single script line that assigns the interface statistics.
// A rejected session shows up either as HTTP 403 or as a page whose only
// job is to bounce the browser back to the login screen.

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use super::client::WebUi;
use crate::error::Error;

pub(crate) const STAT_PATH: &str = "/html/amp/ethinfo/ethinfo.asp";
const DATA_MARKER: &str = "var userEthInfos";
const REDIRECT_MARKER: &str = "top.location.replace(pageName)";

/// Fetch the stat page with `cookie` and return its marker line.
///
/// On a retry the 403 rule no longer applies: the session was just
/// established, so a 403 is a hard failure rather than a stale cookie.
pub(crate) async fn fetch_stat_line(
    web: &WebUi,
    cookie: Option<&str>,
    is_retry: bool,
    cancel: &CancellationToken,
) -> Result<String, Error> {
    let page = web.get(STAT_PATH, cookie, cancel).await?;

    if !is_retry && page.status == StatusCode::FORBIDDEN {
        return Err(Error::NeedAuth);
    }
    if page.status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            status: page.status.as_u16(),
        });
    }

    find_stat_line(&page.text()).map(str::to_owned)
}

/// Scan the page top to bottom. Whichever marker shows up first decides.
pub(crate) fn find_stat_line(body: &str) -> Result<&str, Error> {
    for line in body.lines() {
        if line.contains(REDIRECT_MARKER) {
            return Err(Error::NeedAuth);
        }
        if line.contains(DATA_MARKER) {
            return Ok(line);
        }
    }
    Err(Error::DataNotFound)
}
