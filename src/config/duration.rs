use super::{error::SchemaViolation, fields::wrong_type};
use crate::document::{Number, Value};
use std::time::Duration;

/// The units accepted in duration literals.
const DURATION_UNITS: &[&str] = &["ns", "us", "ms", "s", "m", "h"];

/// Parse a duration that is either a number of seconds or a duration literal like `"5m"`.
///
/// Strings made up only of digits are also interpreted as seconds and an empty string is a zero duration.
/// Fractional seconds are truncated. Literals only accept `ns`, `us`, `ms`, `s`, `m` and `h`, so `"5M"` or `"1y"`
/// are rejected rather than being read as months or years.
pub(crate) fn parse_duration_seconds(field: &'static str, value: &Value) -> Result<Duration, SchemaViolation> {
    let invalid = |reason: &str| SchemaViolation::InvalidDuration { field, reason: reason.to_string() };
    match value {
        Value::Number(Number::Integer(seconds)) => {
            let seconds = u64::try_from(*seconds).map_err(|_| invalid("durations cannot be negative"))?;
            Ok(Duration::from_secs(seconds))
        }
        Value::Number(Number::Float(seconds)) => {
            if *seconds < 0.0 {
                return Err(invalid("durations cannot be negative"));
            }
            Duration::try_from_secs_f64(seconds.trunc()).map_err(|e| invalid(&e.to_string()))
        }
        Value::String(input) => {
            if input.is_empty() {
                Ok(Duration::ZERO)
            } else if input.starts_with('-') {
                Err(invalid("durations cannot be negative"))
            } else if input.chars().all(|c| c.is_ascii_digit()) {
                let seconds = input.parse::<u64>().map_err(|e| invalid(&e.to_string()))?;
                Ok(Duration::from_secs(seconds))
            } else if let Some(unit) = unknown_unit(input) {
                Err(invalid(&format!("unknown time unit '{unit}'")))
            } else {
                humantime::parse_duration(input).map_err(|e| invalid(&e.to_string()))
            }
        }
        other => Err(wrong_type(field, "duration", other)),
    }
}

fn unknown_unit(input: &str) -> Option<&str> {
    input
        .split(|c: char| !c.is_alphabetic())
        .find(|unit| !unit.is_empty() && !DURATION_UNITS.contains(unit))
}
