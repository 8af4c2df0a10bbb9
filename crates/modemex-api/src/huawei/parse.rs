// Statistics line grammars
//
// The stat line is a script assignment holding one `LANStats(...)` call
// per LAN port. Totals are the sum over every call on the line; a single
// bad field fails the whole line.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::model::{Counters, InterfaceSample, checked_sum};

static FIVE_FIELD_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"LANStats\("([^"]+)","([^"]+)","([^"]+)","([^"]+)","([^"]+)""#)
        .expect("static regex")
});

static VARIADIC_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"LANStats\(([^)]+)\)").expect("static regex"));

/// Arguments a variadic call must carry for every index read below.
const VARIADIC_MIN_ARGS: usize = 13;

/// `LANStats("port","txPackets","txBytes","rxPackets","rxBytes")`.
pub(crate) fn parse_five_field(line: &str) -> Result<Counters, Error> {
    let mut counters = Counters::default();
    for caps in FIVE_FIELD_CALL.captures_iter(line) {
        let field = |i: usize| {
            caps.get(i)
                .ok_or_else(|| Error::malformed("missing LANStats field"))
                .and_then(|m| parse_u64(m.as_str()))
        };
        counters.accumulate(InterfaceSample {
            tx_packets: field(2)?,
            tx_bytes: field(3)?,
            rx_packets: field(4)?,
            rx_bytes: field(5)?,
        })?;
    }
    Ok(counters)
}

/// `LANStats(...)` with 64-bit counters split into quoted low/high halves.
///
/// The argument positions come from the firmware's own page script:
/// packets and bytes are (low, high) pairs, and tx/rx bytes each span
/// two pairs that are summed.
pub(crate) fn parse_variadic(line: &str) -> Result<Counters, Error> {
    let mut counters = Counters::default();
    for caps in VARIADIC_CALL.captures_iter(line) {
        let args: Vec<&str> = caps
            .get(1)
            .map(|m| m.as_str().split(',').collect())
            .unwrap_or_default();
        if args.len() < VARIADIC_MIN_ARGS {
            return Err(Error::malformed(format!(
                "LANStats call has {} arguments, expected at least {VARIADIC_MIN_ARGS}",
                args.len()
            )));
        }
        let pair = |high: usize, low: usize| -> Result<u64, Error> {
            Ok(combine(parse_u32(args[high])?, parse_u32(args[low])?))
        };
        counters.accumulate(InterfaceSample {
            tx_packets: pair(2, 1)?,
            tx_bytes: checked_sum(pair(4, 3)?, pair(6, 5)?, "tx bytes")?,
            rx_packets: pair(8, 7)?,
            rx_bytes: checked_sum(pair(10, 9)?, pair(12, 11)?, "rx bytes")?,
        })?;
    }
    Ok(counters)
}

/// Rebuild a 64-bit counter from its 32-bit halves.
pub(crate) fn combine(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches('"')
}

fn parse_u64(field: &str) -> Result<u64, Error> {
    let value = unquote(field);
    value
        .parse()
        .map_err(|e| Error::malformed(format!("invalid counter {value:?}: {e}")))
}

fn parse_u32(field: &str) -> Result<u32, Error> {
    let value = unquote(field);
    value
        .parse()
        .map_err(|e| Error::malformed(format!("invalid 32-bit counter half {value:?}: {e}")))
}
