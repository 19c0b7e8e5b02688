use std::time::Duration;

use crate::error::ValidationError;

/// Milliseconds per accepted unit suffix. A bare number means seconds.
fn unit_millis(unit: &str) -> Option<u64> {
    match unit {
        "ms" => Some(1),
        "" | "s" => Some(1_000),
        "m" => Some(60_000),
        "h" => Some(3_600_000),
        _ => None,
    }
}

/// Parse `250ms`, `30s`, `2m`, `1h`, or a bare number of seconds.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    if amount.is_empty() {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let amount: u64 = amount
        .parse()
        .map_err(|source| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source,
        })?;
    let scale = unit_millis(unit).ok_or_else(|| ValidationError::InvalidDurationUnit {
        unit: unit.to_owned(),
    })?;
    let millis = amount
        .checked_mul(scale)
        .ok_or(ValidationError::DurationOverflow)?;
    if millis == 0 {
        return Err(ValidationError::DurationZero);
    }
    Ok(Duration::from_millis(millis))
}
