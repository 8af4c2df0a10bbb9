// Adapter registry
//
// Maps a (vendor, model) pair to the constructor of its adapter. Each
// adapter module declares its own `REGISTRATION`; the registry collects
// them once, on first use, and is read-only afterwards.

use std::sync::LazyLock;

use crate::error::Error;
use crate::huawei;
use crate::modem::{Modem, ModemConfig};

/// Builds an adapter for one device.
pub type Constructor = fn(ModemConfig) -> Result<Box<dyn Modem>, Error>;

/// One adapter's entry in the registry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub vendor: &'static str,
    pub model: &'static str,
    pub build: Constructor,
}

/// The set of adapters compiled into this binary.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<Registration>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    Registry::from_registrations([
        huawei::eg8141a5::REGISTRATION,
        huawei::eg8141a5v5::REGISTRATION,
    ])
});

impl Registry {
    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn from_registrations(entries: impl IntoIterator<Item = Registration>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Every registered adapter, in registration order.
    pub fn entries(&self) -> &[Registration] {
        &self.entries
    }

    /// Find the registration for `vendor`/`model` (ASCII case-insensitive).
    ///
    /// An unknown vendor and an unknown model of a known vendor are
    /// reported separately so a typo is easy to spot.
    pub fn lookup(&self, vendor: &str, model: &str) -> Result<&Registration, Error> {
        let mut vendor_known = false;
        for entry in &self.entries {
            if !entry.vendor.eq_ignore_ascii_case(vendor) {
                continue;
            }
            vendor_known = true;
            if entry.model.eq_ignore_ascii_case(model) {
                return Ok(entry);
            }
        }

        if vendor_known {
            Err(Error::UnknownModel {
                vendor: vendor.to_owned(),
                model: model.to_owned(),
            })
        } else {
            Err(Error::UnknownVendor {
                vendor: vendor.to_owned(),
            })
        }
    }

    /// Look up and construct the adapter for `vendor`/`model`.
    pub fn build(
        &self,
        vendor: &str,
        model: &str,
        config: ModemConfig,
    ) -> Result<Box<dyn Modem>, Error> {
        let entry = self.lookup(vendor, model)?;
        (entry.build)(config)
    }
}
