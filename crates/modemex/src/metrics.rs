//! Prometheus exposition for one device's counters.

use std::sync::{Mutex, PoisonError};

use prometheus::{
    Encoder, IntCounterVec, Opts, Registry, TextEncoder, register_int_counter_vec_with_registry,
};

use modemex_api::{Counters, DeviceInfo};

const NAMESPACE: &str = "modem";
const LABELS: [&str; 2] = ["vendor", "model"];

/// Counter families for a single device, re-set from each fresh read.
pub struct Exposition {
    registry: Registry,
    encoder: TextEncoder,
    // Serializes set-then-encode across concurrent scrapes.
    mutex: Mutex<()>,
    labels: [String; 2],
    rx_bytes: IntCounterVec,
    rx_packets: IntCounterVec,
    tx_bytes: IntCounterVec,
    tx_packets: IntCounterVec,
}

fn family(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounterVec> {
    register_int_counter_vec_with_registry!(
        Opts::new(name, help).namespace(NAMESPACE),
        &LABELS,
        registry,
    )
}

impl Exposition {
    pub fn new(info: &DeviceInfo) -> prometheus::Result<Self> {
        let registry = Registry::new();

        Ok(Self {
            rx_bytes: family(&registry, "rx_bytes", "Bytes received on the LAN ports")?,
            rx_packets: family(&registry, "rx_packets", "Packets received on the LAN ports")?,
            tx_bytes: family(&registry, "tx_bytes", "Bytes sent on the LAN ports")?,
            tx_packets: family(&registry, "tx_packets", "Packets sent on the LAN ports")?,
            registry,
            encoder: TextEncoder::new(),
            mutex: Mutex::new(()),
            labels: [info.vendor.clone(), info.model.clone()],
        })
    }

    pub fn content_type(&self) -> &str {
        self.encoder.format_type()
    }

    /// Load `counters` into the families and encode them as text.
    pub fn render(&self, counters: &Counters) -> prometheus::Result<String> {
        let _held = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);

        let labels = [self.labels[0].as_str(), self.labels[1].as_str()];
        for (vec, value) in [
            (&self.rx_bytes, counters.rx_bytes),
            (&self.rx_packets, counters.rx_packets),
            (&self.tx_bytes, counters.tx_bytes),
            (&self.tx_packets, counters.tx_packets),
        ] {
            let counter = vec.with_label_values(&labels);
            counter.reset();
            counter.inc_by(value);
        }

        let mut out = String::new();
        self.encoder.encode_utf8(&self.registry.gather(), &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// The value of `name`'s single sample, checking it carries both labels.
    pub(crate) fn sample(body: &str, name: &str, vendor: &str, model: &str) -> String {
        let line = body
            .lines()
            .find(|l| l.starts_with(&format!("{name}{{")))
            .unwrap_or_else(|| panic!("no sample for {name} in:\n{body}"));
        assert!(line.contains(&format!("vendor=\"{vendor}\"")), "{line}");
        assert!(line.contains(&format!("model=\"{model}\"")), "{line}");
        line.rsplit(' ').next().unwrap().to_owned()
    }

    fn counters() -> Counters {
        Counters {
            tx_bytes: 2100,
            tx_packets: 11,
            rx_bytes: 4200,
            rx_packets: 22,
            ..Counters::default()
        }
    }

    #[test]
    fn renders_all_four_counter_families() {
        let exposition = Exposition::new(&DeviceInfo::new("Huawei", "EG8141A5")).unwrap();
        let body = exposition.render(&counters()).unwrap();

        for name in ["rx_bytes", "rx_packets", "tx_bytes", "tx_packets"] {
            assert!(body.contains(&format!("# TYPE modem_{name} counter\n")), "{body}");
        }
        let value = |name| sample(&body, name, "Huawei", "EG8141A5");
        assert_eq!(value("modem_rx_bytes"), "4200");
        assert_eq!(value("modem_rx_packets"), "22");
        assert_eq!(value("modem_tx_bytes"), "2100");
        assert_eq!(value("modem_tx_packets"), "11");
    }

    #[test]
    fn each_render_replaces_the_previous_values() {
        let exposition = Exposition::new(&DeviceInfo::new("Huawei", "EG8141A5V5")).unwrap();
        exposition.render(&counters()).unwrap();

        // A device reboot resets its counters; the exposition follows.
        let body = exposition
            .render(&Counters {
                rx_bytes: 7,
                ..Counters::default()
            })
            .unwrap();

        assert_eq!(sample(&body, "modem_rx_bytes", "Huawei", "EG8141A5V5"), "7");
        assert_eq!(sample(&body, "modem_tx_bytes", "Huawei", "EG8141A5V5"), "0");
    }

    #[test]
    fn label_values_are_escaped() {
        let exposition = Exposition::new(&DeviceInfo::new("Acme \"Labs\"", "X\\1")).unwrap();
        let body = exposition.render(&counters()).unwrap();

        assert_eq!(
            sample(&body, "modem_tx_packets", "Acme \\\"Labs\\\"", "X\\\\1"),
            "11"
        );
    }

    #[test]
    fn content_type_is_text_exposition() {
        let exposition = Exposition::new(&DeviceInfo::new("Huawei", "EG8141A5")).unwrap();
        assert_eq!(exposition.content_type(), "text/plain; version=0.0.4");
    }
}
