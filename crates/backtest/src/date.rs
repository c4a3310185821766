//! ISO date parsing to epoch nanoseconds.
//!
//! Accepts `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM:SS` (optionally `Z`-suffixed),
//! always UTC. Date-only inputs resolve per [`DateBoundary`].

use crate::error::SimulationError;

/// Boundary resolution for date-only inputs.
#[derive(Clone, Copy)]
pub enum DateBoundary {
    /// Start of the day (00:00:00).
    Start,
    /// End of the day (23:59:59).
    End,
}

/// Parses an ISO-like datetime string to epoch nanoseconds.
///
/// # Errors
/// Returns [`SimulationError::DateParse`] on malformed input.
pub fn parse_datetime_ns(value: &str, boundary: DateBoundary) -> Result<i64, SimulationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SimulationError::DateParse("empty datetime".to_string()));
    }

    let (date_part, time_part) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time.trim_end_matches('Z'))),
        None => (value, None),
    };

    let (year, month, day) = parse_date(date_part)?;
    let (hour, minute, second) = match time_part {
        Some(time) => parse_time(time)?,
        None => match boundary {
            DateBoundary::Start => (0, 0, 0),
            DateBoundary::End => (23, 59, 59),
        },
    };

    let days = days_from_civil(year, month, day);
    let seconds = days
        .checked_mul(86_400)
        .and_then(|v| v.checked_add(i64::from(hour) * 3_600))
        .and_then(|v| v.checked_add(i64::from(minute) * 60))
        .and_then(|v| v.checked_add(i64::from(second)))
        .ok_or_else(|| SimulationError::DateParse("datetime overflow".to_string()))?;

    seconds
        .checked_mul(1_000_000_000)
        .ok_or_else(|| SimulationError::DateParse("datetime overflow".to_string()))
}

fn parse_date(date: &str) -> Result<(i32, u32, u32), SimulationError> {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 {
        return Err(SimulationError::DateParse(format!(
            "invalid date format: {date}"
        )));
    }

    let year: i32 = parts[0]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid year: {date}")))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid month: {date}")))?;
    let day: u32 = parts[2]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid day: {date}")))?;

    if month == 0 || month > 12 {
        return Err(SimulationError::DateParse(format!("invalid month: {date}")));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(SimulationError::DateParse(format!("invalid day: {date}")));
    }

    Ok((year, month, day))
}

fn parse_time(time: &str) -> Result<(u32, u32, u32), SimulationError> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 3 {
        return Err(SimulationError::DateParse(format!(
            "invalid time format: {time}"
        )));
    }

    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid hour: {time}")))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid minute: {time}")))?;
    let second: u32 = parts[2]
        .parse()
        .map_err(|_| SimulationError::DateParse(format!("invalid second: {time}")))?;

    if hour > 23 || minute > 59 || second > 59 {
        return Err(SimulationError::DateParse(format!(
            "invalid time value: {time}"
        )));
    }

    Ok((hour, minute, second))
}

fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = i64::from(month);
    let d = i64::from(day);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
