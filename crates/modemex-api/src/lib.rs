// modemex-api: session-aware scrapers for home router / ONT web UIs

pub mod error;
pub mod model;
pub mod modem;
pub mod registry;
pub mod session;
pub mod transport;

mod huawei;

pub use error::{Error, Operation};
pub use model::{Counters, DeviceInfo};
pub use modem::{Modem, ModemConfig};
pub use registry::{Registration, Registry};
pub use transport::{TlsMode, TransportConfig};
