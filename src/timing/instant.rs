use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DAYS_IN_WEEK: u8 = 7;

/// Whether `time` reads as an HHMM clock value, 0000 to 2359.
pub fn is_valid_hhmm(time: u16) -> bool {
    time <= 2359 && time % 100 < 60
}

/// The moment a schedule is evaluated against: weekday (0 = Sunday) and HHMM time.
///
/// Always built from data, so evaluation never reads the clock itself. Use `now_in` at the
/// call site to sample the wall clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstantFields")]
pub struct EvaluationInstant {
    day: u8,
    time: u16,
}

#[derive(Deserialize)]
struct InstantFields {
    day: u8,
    time: u16,
}

impl TryFrom<InstantFields> for EvaluationInstant {
    type Error = Error;

    fn try_from(fields: InstantFields) -> Result<Self, Self::Error> {
        Self::new(fields.day, fields.time).ok_or(Error::InstantOutOfRange {
            day: fields.day,
            time: fields.time,
        })
    }
}

impl EvaluationInstant {
    /// Returns `None` unless `day` is 0-6 and `time` is a valid HHMM value.
    pub fn new(day: u8, time: u16) -> Option<Self> {
        if day >= DAYS_IN_WEEK || !is_valid_hhmm(time) {
            return None;
        }
        Some(Self { day, time })
    }

    pub fn from_datetime<Z: TimeZone>(timestamp: &DateTime<Z>) -> Self {
        let day = timestamp.weekday().num_days_from_sunday() as u8;
        let hm = timestamp.hour() * 100 + timestamp.minute();
        Self {
            day,
            time: hm as u16,
        }
    }

    pub fn now_in(timezone: Tz) -> Self {
        Self::from_datetime(&zoned_now(timezone))
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn time(&self) -> u16 {
        self.time
    }
}

pub fn zoned_now(timezone: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&timezone)
}
