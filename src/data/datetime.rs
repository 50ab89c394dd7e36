use chrono::NaiveDateTime;

/// Sentinel value returned by `detect_date_format` when the column contains
/// RFC 3339 / ISO 8601 timestamps (e.g. `2026-02-10T22:26:28.987Z`).
pub const RFC3339_FORMAT: &str = "__rfc3339__";

/// Date formats tried for time columns, most specific first. Day-first and
/// month-first variants are both listed; whichever parses more of the column wins.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m-%d-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S%.f",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

/// Rows sampled when scoring candidate formats.
const FORMAT_SAMPLE_ROWS: usize = 100;

/// Pick the format that parses the largest share of `values`.
///
/// RFC 3339 timestamps with an offset (`2026-02-10T22:26:28.987Z`) are
/// reported as [`RFC3339_FORMAT`]. Ties keep the earlier candidate.
pub fn detect_date_format<S: AsRef<str>>(values: &[S]) -> Option<&'static str> {
    let sample: Vec<&str> = values
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .take(FORMAT_SAMPLE_ROWS)
        .collect();
    if sample.is_empty() {
        return None;
    }

    let hits = |fmt: &str| sample.iter().filter(|s| parse_to_timestamp(s, fmt).is_some()).count();

    std::iter::once(RFC3339_FORMAT)
        .chain(DATE_FORMATS.iter().copied())
        .map(|fmt| (fmt, hits(fmt)))
        .filter(|&(_, n)| n > 0)
        .fold(None, |best: Option<(&'static str, usize)>, cand| match best {
            Some(b) if b.1 >= cand.1 => Some(b),
            _ => Some(cand),
        })
        .map(|(fmt, _)| fmt)
}

/// Unix seconds for `value` under `format`, keeping millisecond precision.
/// Date-only formats resolve to midnight UTC.
pub fn parse_to_timestamp(value: &str, format: &str) -> Option<f64> {
    let millis = if format == RFC3339_FORMAT {
        chrono::DateTime::parse_from_rfc3339(value).ok()?.timestamp_millis()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        dt.and_utc().timestamp_millis()
    } else {
        let date = chrono::NaiveDate::parse_from_str(value, format).ok()?;
        date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis()
    };
    Some(millis as f64 / 1000.0)
}

/// Convert a column of date strings to Unix seconds.
/// Returns `None` unless every value parses with one common format.
pub fn column_to_timestamps<S: AsRef<str>>(data: &[S]) -> Option<Vec<f64>> {
    if data.is_empty() {
        return None;
    }
    let format = detect_date_format(data)?;
    data.iter()
        .map(|s| parse_to_timestamp(s.as_ref().trim(), format))
        .collect()
}
