// Shared transport configuration and cancellation plumbing.
//
// Every adapter builds its `reqwest::Client` here. The client keeps no
// cookie jar: session cookies belong to the adapter, which sets the
// `Cookie` header itself so it can tell when a session was rejected.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// How the device's HTTPS certificate is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Trust only the platform roots.
    #[default]
    System,
    /// Also trust the PEM root the device's certificate chains to.
    CustomCa(PathBuf),
    /// Skip verification, for a self-signed ONT on the LAN.
    DangerAcceptInvalid,
}

/// Timeout, certificate policy and agent string for talking to one device.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: concat!("modemex/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// A client for one device's web UI. It never stores cookies.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!(
                        "failed to read CA cert for device from {}: {e}",
                        path.display()
                    ))
                })?;
                let root = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    Error::Tls(format!("{} is not a PEM certificate: {e}", path.display()))
                })?;
                builder = builder.add_root_certificate(root);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("could not set up device client: {e}")))
    }
}

/// Race a network future against `cancel`.
///
/// A fired token wins even when the future is also ready, so a cancelled
/// read never commits a result it did not wait for.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res.map_err(Error::Transport),
    }
}
