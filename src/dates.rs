//! Date Functions
//!
//! Formatting and arithmetic over `chrono`. Layouts are strftime strings.
//! Bad layouts, zones and durations degrade instead of failing the render.

use std::fmt::{self, Write};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use tracing::warn;

use crate::config::FuncConfig;
use crate::registry::FuncMap;
use crate::value::{kind_of, Value};

pub const HTML_DATE: &str = "%Y-%m-%d";

/// Timestamp view of a value: times, unix seconds or RFC 3339 strings.
/// Anything else is the unix epoch.
pub fn to_time(v: &Value) -> DateTime<Utc> {
    let parsed = match v {
        Value::Time(t) => Some(*t),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
        Value::Uint(secs) => i64::try_from(*secs).ok().and_then(|s| DateTime::from_timestamp(s, 0)),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Ref(r) => r.target().map(to_time),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(kind = %kind_of(v), "not a timestamp, using unix epoch");
        DateTime::UNIX_EPOCH
    })
}

fn render<Tz: TimeZone>(t: &DateTime<Tz>, layout: &str, fallback: &str) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", t.format(layout)).is_ok() {
        return out;
    }
    warn!(layout, "invalid date layout, using fallback");
    out.clear();
    if write!(out, "{}", t.format(fallback)).is_ok() {
        return out;
    }
    t.to_rfc3339()
}

/// Format in the named zone. `UTC` and `Local` are understood; anything
/// else formats in UTC.
pub fn date_in_zone(layout: &str, t: DateTime<Utc>, zone: &str, fallback: &str) -> String {
    match zone {
        "Local" | "local" => render(&t.with_timezone(&Local), layout, fallback),
        "UTC" | "utc" | "" => render(&t, layout, fallback),
        other => {
            warn!(zone = other, "unknown time zone, using UTC");
            render(&t, layout, fallback)
        }
    }
}

/// Parse a duration such as `1h30m`, `-90s` or `1.5h`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest == "0" {
        return Some(Duration::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let mut nanos = 0.0_f64;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let number: f64 = rest[..num_end].parse().ok()?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        nanos += number * scale;
        rest = &rest[unit_end..];
    }

    if negative {
        nanos = -nanos;
    }
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::nanoseconds(nanos as i64))
}

/// Render whole seconds as `1h2m3s`, `2m0s` or `45s`.
pub fn format_duration(d: Duration) -> String {
    let millis = d.num_milliseconds();
    let total = (millis as f64 / 1000.0).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
    if h > 0 {
        format!("{}{}h{}m{}s", sign, h, m, s)
    } else if m > 0 {
        format!("{}{}m{}s", sign, m, s)
    } else {
        format!("{}{}s", sign, s)
    }
}

/// Shift `t` by `delta`; an unparseable delta leaves `t` unchanged.
pub fn date_modify(delta: &str, t: DateTime<Utc>) -> DateTime<Utc> {
    match parse_duration(delta).and_then(|d| t.checked_add_signed(d)) {
        Some(shifted) => shifted,
        None => {
            warn!(delta, "cannot apply duration, date unchanged");
            t
        }
    }
}

pub fn ago(t: DateTime<Utc>) -> String {
    format_duration(Utc::now().signed_duration_since(t))
}

pub(crate) fn register(funcs: &mut FuncMap, config: &FuncConfig) {
    if !config.hermetic {
        funcs.define("now", |a| {
            a.exactly(0)?;
            Ok(Value::Time(Utc::now()))
        });
        funcs.define("ago", |a| {
            a.exactly(1)?;
            Ok(Value::from(ago(to_time(a.get(0)))))
        });
    }

    let fallback = config.date_format.clone();
    funcs.define("date", move |a| {
        a.exactly(2)?;
        let t = to_time(a.get(1));
        Ok(Value::from(render(&t, &a.string(0), &fallback)))
    });
    let fallback = config.date_format.clone();
    funcs.define("dateInZone", move |a| {
        a.exactly(3)?;
        let t = to_time(a.get(1));
        Ok(Value::from(date_in_zone(&a.string(0), t, &a.string(2), &fallback)))
    });
    funcs.define("htmlDate", |a| {
        a.exactly(1)?;
        Ok(Value::from(render(&to_time(a.get(0)), HTML_DATE, HTML_DATE)))
    });
    funcs.define("htmlDateInZone", |a| {
        a.exactly(2)?;
        let t = to_time(a.get(0));
        Ok(Value::from(date_in_zone(HTML_DATE, t, &a.string(1), HTML_DATE)))
    });
    funcs.define("dateModify", |a| {
        a.exactly(2)?;
        Ok(Value::Time(date_modify(&a.string(0), to_time(a.get(1)))))
    });
}
