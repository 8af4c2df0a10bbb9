use futures_util::future::BoxFuture;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::model::{Counters, DeviceInfo};
use crate::transport::TransportConfig;

/// The read contract every vendor adapter implements.
///
/// Adapters own their session state. `read_counters` may authenticate,
/// re-authenticate once on a rejected session, and must abort promptly
/// with [`Error::Cancelled`] once `cancel` fires.
pub trait Modem: Send + Sync {
    /// Which vendor and model this adapter speaks to.
    fn info(&self) -> &DeviceInfo;

    /// Read the current traffic totals from the device.
    fn read_counters<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Counters, Error>>;
}

/// Everything an adapter needs to reach one device.
///
/// Built by the config layer. This crate never reads config files or
/// the environment.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Web UI root (e.g. `http://192.168.100.1`).
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub transport: TransportConfig,
}
