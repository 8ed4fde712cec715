use chrono::{NaiveDate, NaiveDateTime};

pub const DISPLAY_TIME_FORMAT: &str = "%d %B %Y, %H:%M:%S UTC";
pub const INVALID_DATE: &str = "Invalid date";

/// Parses an ASN.1 UTCTime (`YYMMDDHHMMSSZ`) or GeneralizedTime
/// (`YYYYMMDDHHMMSSZ`) value.
pub fn parse_compact_time(raw: &str) -> Option<NaiveDateTime> {
    let digits = raw.strip_suffix('Z')?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (year, rest) = match digits.len() {
        12 => {
            let yy: i32 = digits[..2].parse().ok()?;
            // RFC 5280 4.1.2.5.1
            let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
            (year, &digits[2..])
        }
        14 => (digits[..4].parse().ok()?, &digits[4..]),
        _ => return None,
    };

    let field = |at: usize| rest[at..at + 2].parse::<u32>().ok();
    NaiveDate::from_ymd_opt(year, field(0)?, field(2)?)?.and_hms_opt(field(4)?, field(6)?, field(8)?)
}

/// Long-form UTC rendering used by the detail view, e.g.
/// `01 January 2024, 00:00:00 UTC`. Unparseable input renders
/// [`INVALID_DATE`].
pub fn format_compact_time(raw: &str) -> String {
    match parse_compact_time(raw) {
        Some(time) => time.format(DISPLAY_TIME_FORMAT).to_string(),
        None => INVALID_DATE.to_owned(),
    }
}
