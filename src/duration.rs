use std::time::Duration;

use crate::error::{Result, TimerError};

/// Parse a duration token from the command line.
///
/// A bare number is seconds (`5`, `2.5`). Anything else is one or more
/// `<number><unit>` groups such as `2m`, `1h30m` or `250ms`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(TimerError::invalid_duration(input));
    }

    // plain decimal only; `f64::parse` alone would also take `1e3`
    if s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let secs: f64 = s.parse().map_err(|_| TimerError::invalid_duration(input))?;
        return Duration::try_from_secs_f64(secs).map_err(|_| TimerError::invalid_duration(input));
    }

    let mut total_secs = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(TimerError::invalid_duration(input));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| TimerError::invalid_duration(input))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_scale(&rest[..unit_len]).ok_or_else(|| TimerError::invalid_duration(input))?;
        rest = &rest[unit_len..];

        total_secs += value * scale;
    }

    Duration::try_from_secs_f64(total_secs).map_err(|_| TimerError::invalid_duration(input))
}

fn unit_scale(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1e-9),
        "us" | "µs" => Some(1e-6),
        "ms" => Some(1e-3),
        "s" => Some(1.0),
        "m" => Some(60.0),
        "h" => Some(3600.0),
        _ => None,
    }
}
