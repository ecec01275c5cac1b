//! Date and time encodings shared by the placement backend payloads.
//!
//! The backend hands dates back either as a plain `YYYY-MM-DD` or as an ISO date-time with a
//! zero time component, and times either as `HH:MM` or `HH:MM:SS`. Outgoing times use the short
//! form unless they carry seconds, which are written back unchanged.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const TIME_WITH_SECONDS_FORMAT: &str = "%H:%M:%S";

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|value| value.date())
        })
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_WITH_SECONDS_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, TIME_FORMAT))
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}

/// Wire form of a time: `HH:MM`, or `HH:MM:SS` when the seconds are not zero.
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format(TIME_FORMAT).to_string()
    } else {
        time.format(TIME_WITH_SECONDS_FORMAT).to_string()
    }
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

pub(crate) fn deserialize_optional_time<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_time(&value).map_err(serde::de::Error::custom))
        .transpose()
}

pub(crate) fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn serialize_optional_date<S>(
    value: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn serialize_optional_time<S>(
    value: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(time) => serializer.serialize_str(&format_time(*time)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_datetime_for_dates() {
        let date = parse_date("2024-05-01T00:00:00").expect("datetime form parses");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid"));
    }

    #[test]
    fn short_and_long_times_are_equal() {
        assert_eq!(
            parse_time("09:00").expect("short"),
            parse_time("09:00:00").expect("long")
        );
    }

    #[test]
    fn seconds_survive_formatting() {
        let on_the_minute = parse_time("09:00:00").expect("long");
        let with_seconds = parse_time("09:00:30").expect("long");
        assert_eq!(format_time(on_the_minute), "09:00");
        assert_eq!(format_time(with_seconds), "09:00:30");
    }

    #[test]
    fn rejects_garbage_dates() {
        let err = parse_date("next tuesday").expect_err("not a date");
        assert!(err.contains("YYYY-MM-DD"));
    }
}
