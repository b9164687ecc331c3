use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_OFFSET_SECS: i32 = 9 * 3600;

/// Fixed UTC offset used to decide what "today" is, independent of the
/// host clock's local zone.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub fn today_string(&self) -> String {
        date_key(self.today())
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
        }
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Normalizes a date string to `YYYY-MM-DD`.
///
/// Strings already shaped like `YYYY-MM-DD` are returned untouched, even if
/// they name an impossible day. Anything else is parsed and its calendar date
/// is taken as written; no timezone conversion happens here.
pub fn format_date(input: &str) -> Option<String> {
    if is_strict_date(input) {
        return Some(input.to_string());
    }
    parse_date(input).map(date_key)
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.date());
        }
    }
    for format in ["%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }
    None
}

pub fn shift_date(input: &str, delta_days: i64) -> Option<String> {
    let date = parse_date(input)?;
    let step = Days::new(delta_days.unsigned_abs());
    let shifted = if delta_days >= 0 {
        date.checked_add_days(step)?
    } else {
        date.checked_sub_days(step)?
    };
    Some(date_key(shifted))
}

fn is_strict_date(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
