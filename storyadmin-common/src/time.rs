use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike as _};

/// Wire format of every mutable timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("unrecognised timestamp `{0}`")]
pub struct TimestampError(pub String);

/// Offset applied to server timestamps while they sit in an edit form.
///
/// Loading adds the offset, submitting removes it again, so a value the
/// operator did not touch goes back to the server unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateShift {
    hours: i64,
}

impl DateShift {
    pub const NONE: DateShift = DateShift { hours: 0 };

    pub const fn hours(hours: i64) -> Self {
        Self { hours }
    }

    pub fn to_local(&self, server: NaiveDateTime) -> NaiveDateTime {
        server + Duration::hours(self.hours)
    }

    pub fn to_server(&self, local: NaiveDateTime) -> NaiveDateTime {
        local - Duration::hours(self.hours)
    }
}

impl Default for DateShift {
    fn default() -> Self {
        Self::NONE
    }
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts the wire format as well as the ISO forms the backend hands out on
/// detail endpoints.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = value.trim();

    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(parsed);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(parsed);
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Ok(parsed);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimestampError(value.to_string()))
}

/// Current wall clock, truncated to whole seconds like the wire format.
pub fn now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();

    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn parses_wire_and_iso_forms() {
        let expected = at("2024-03-01 10:15:00");

        assert_eq!(parse_timestamp("2024-03-01 10:15:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:15:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:15:00.000Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T17:15:00+07:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:15:00").unwrap(), expected);
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            at("2024-03-01 00:00:00")
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            parse_timestamp("yesterday"),
            Err(TimestampError("yesterday".into()))
        );
    }

    #[test]
    fn shift_round_trips() {
        let shift = DateShift::hours(7);
        let server = at("2024-12-31 20:30:00");

        let local = shift.to_local(server);
        assert_eq!(local, at("2025-01-01 03:30:00"));
        assert_eq!(format_timestamp(shift.to_server(local)), "2024-12-31 20:30:00");
    }

    #[test]
    fn now_has_no_subseconds() {
        let now = now();

        assert_eq!(now, at(&format_timestamp(now)));
    }
}
