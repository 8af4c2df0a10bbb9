use bytes::Bytes;

use crate::error::Error;

/// Static descriptor of the wire dialect an adapter speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor: String,
    pub model: String,
    /// Vendor-specific payload, opaque to the exporter.
    pub extra: Bytes,
}

impl DeviceInfo {
    pub fn new(vendor: &str, model: &str) -> Self {
        Self {
            vendor: vendor.to_owned(),
            model: model.to_owned(),
            extra: Bytes::new(),
        }
    }
}

/// Traffic totals across every LAN interface reported on the stat page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    /// Vendor-specific payload, opaque to the exporter.
    pub extra: Bytes,
}

/// One interface's contribution to [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct InterfaceSample {
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub rx_packets: u64,
}

impl Counters {
    /// Add one interface sample. Overflow means the page reported garbage.
    pub(crate) fn accumulate(&mut self, sample: InterfaceSample) -> Result<(), Error> {
        self.tx_bytes = checked_sum(self.tx_bytes, sample.tx_bytes, "tx bytes")?;
        self.tx_packets = checked_sum(self.tx_packets, sample.tx_packets, "tx packets")?;
        self.rx_bytes = checked_sum(self.rx_bytes, sample.rx_bytes, "rx bytes")?;
        self.rx_packets = checked_sum(self.rx_packets, sample.rx_packets, "rx packets")?;
        Ok(())
    }
}

pub(crate) fn checked_sum(a: u64, b: u64, what: &str) -> Result<u64, Error> {
    a.checked_add(b)
        .ok_or_else(|| Error::malformed(format!("{what} total overflows 64 bits")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_sums_field_wise() {
        let mut counters = Counters::default();
        let sample = InterfaceSample {
            tx_bytes: 1,
            tx_packets: 2,
            rx_bytes: 3,
            rx_packets: 4,
        };

        counters.accumulate(sample).unwrap();
        counters.accumulate(sample).unwrap();

        assert_eq!(counters.tx_bytes, 2);
        assert_eq!(counters.tx_packets, 4);
        assert_eq!(counters.rx_bytes, 6);
        assert_eq!(counters.rx_packets, 8);
    }

    #[test]
    fn accumulate_rejects_overflow() {
        let mut counters = Counters {
            rx_bytes: u64::MAX,
            ..Counters::default()
        };
        let sample = InterfaceSample {
            rx_bytes: 1,
            ..InterfaceSample::default()
        };

        assert!(matches!(
            counters.accumulate(sample),
            Err(Error::MalformedData { .. })
        ));
    }
}
