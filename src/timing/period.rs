use std::fmt;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use super::instant::{is_valid_hhmm, EvaluationInstant, DAYS_IN_WEEK};

/// One end of a `Period`: a weekday (0 = Sunday) and an HHMM clock time.
///
/// Either half may be missing. Values that are out of range or unreadable on the wire are
/// stored as missing, which makes the evaluator skip the whole period.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTime {
    #[serde(default, deserialize_with = "lenient_day")]
    day: Option<u8>,
    #[serde(default, deserialize_with = "lenient_time")]
    time: Option<u16>,
}

impl DayTime {
    pub fn new(day: Option<u8>, time: Option<u16>) -> Self {
        Self {
            day: day.filter(|day| *day < DAYS_IN_WEEK),
            time: time.filter(|time| is_valid_hhmm(*time)),
        }
    }

    pub fn at(day: u8, time: u16) -> Self {
        Self::new(Some(day), Some(time))
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }

    pub fn time(&self) -> Option<u16> {
        self.time
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        match self.day {
            Some(day) => write!(f, "{}", NAMES[day as usize])?,
            None => write!(f, "---")?,
        }
        match self.time {
            Some(time) => write!(f, " {:02}:{:02}", time / 100, time % 100),
            None => write!(f, " --:--"),
        }
    }
}

/// A single recurring weekly interval, from `open` until `close`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, deserialize_with = "lenient_day_time")]
    open: Option<DayTime>,
    #[serde(default, deserialize_with = "lenient_day_time")]
    close: Option<DayTime>,
}

impl Period {
    pub fn new(open: DayTime, close: DayTime) -> Self {
        Self {
            open: Some(open),
            close: Some(close),
        }
    }

    pub fn from_parts(open: Option<DayTime>, close: Option<DayTime>) -> Self {
        Self { open, close }
    }

    pub fn open(&self) -> Option<DayTime> {
        self.open
    }

    pub fn close(&self) -> Option<DayTime> {
        self.close
    }

    /// Returns `(open_day, open_time, close_day, close_time)` once every field is present.
    ///
    /// A close on the opening day at or before the opening time means the period runs past
    /// midnight, so the returned close day is moved to the following day.
    fn bounds(&self) -> Option<(u8, u16, u8, u16)> {
        let open = self.open?;
        let close = self.close?;
        let (open_day, open_time) = (open.day?, open.time?);
        let (close_day, close_time) = (close.day?, close.time?);

        if close_day == open_day && close_time <= open_time {
            return Some((open_day, open_time, (open_day + 1) % DAYS_IN_WEEK, close_time));
        }
        Some((open_day, open_time, close_day, close_time))
    }

    /// Whether `now` falls inside this period. Incomplete periods never match.
    pub fn is_open_at(&self, now: EvaluationInstant) -> bool {
        let Some((open_day, open_time, close_day, close_time)) = self.bounds() else {
            return false;
        };
        let spans_days = close_day != open_day;

        if open_day == now.day() {
            if !spans_days {
                if open_time <= now.time() && now.time() < close_time {
                    return true;
                }
            } else if now.time() >= open_time || now.time() < close_time {
                return true;
            }
        }

        // Tail of a period that opened on an earlier day
        spans_days && close_day == now.day() && now.time() < close_time
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.open.unwrap_or_default();
        let close = self.close.unwrap_or_default();
        write!(f, "{open} - {close}")
    }
}

/// Anything that can show up in a day or time slot on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawNumber {
    fn value(self) -> Option<i64> {
        match self {
            RawNumber::Integer(value) => Some(value),
            RawNumber::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                Some(value as i64)
            }
            RawNumber::Float(_) => None,
            RawNumber::Text(text) => leading_integer(&text),
            RawNumber::Other(_) => None,
        }
    }
}

/// Reads the integer at the start of `text`, so "0930" is 930 and "0930h" is 930 too.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn lenient_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let value = RawNumber::deserialize(deserializer)?.value();
    Ok(value
        .and_then(|day| u8::try_from(day).ok())
        .filter(|day| *day < DAYS_IN_WEEK))
}

fn lenient_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
    let value = RawNumber::deserialize(deserializer)?.value();
    Ok(value
        .and_then(|time| u16::try_from(time).ok())
        .filter(|time| is_valid_hhmm(*time)))
}

fn lenient_day_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DayTime>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDayTime {
        Value(DayTime),
        Other(IgnoredAny),
    }

    Ok(match RawDayTime::deserialize(deserializer)? {
        RawDayTime::Value(day_time) => Some(day_time),
        RawDayTime::Other(_) => None,
    })
}
