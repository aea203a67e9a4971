use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use super::{instant::EvaluationInstant, period::Period};

/// A place's recurring weekly opening hours.
///
/// This mirrors the `{"periods": [...]}` object the places API hands back. Order of the
/// periods has no effect on evaluation but is kept as given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default, deserialize_with = "lenient_periods")]
    periods: Vec<Period>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_periods(periods: Vec<Period>) -> Self {
        Self { periods }
    }

    pub fn add_period(&mut self, period: Period) {
        self.periods.push(period);
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// True when at least one period covers `now`.
    pub fn is_open(&self, now: EvaluationInstant) -> bool {
        self.periods.iter().any(|period| period.is_open_at(now))
    }
}

/// Decides whether a place is open at `now`.
///
/// A missing or empty schedule is closed, and periods with missing fields are skipped, so this
/// never fails. Sample the clock with `EvaluationInstant::now_in` before calling.
pub fn is_open_now(schedule: Option<&WeeklySchedule>, now: EvaluationInstant) -> bool {
    schedule.is_some_and(|schedule| schedule.is_open(now))
}

/// A `periods` value that is not a list is treated as no periods, and list entries that are not
/// objects become empty periods.
fn lenient_periods<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Period>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPeriods {
        List(Vec<RawPeriod>),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPeriod {
        Value(Period),
        Other(IgnoredAny),
    }

    Ok(match RawPeriods::deserialize(deserializer)? {
        RawPeriods::List(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                RawPeriod::Value(period) => period,
                RawPeriod::Other(_) => Period::default(),
            })
            .collect(),
        RawPeriods::Other(_) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::period::DayTime;

    fn instant(day: u8, time: u16) -> EvaluationInstant {
        EvaluationInstant::new(day, time).unwrap()
    }

    fn weekday_nine_to_five() -> WeeklySchedule {
        WeeklySchedule::from_periods(vec![Period::new(DayTime::at(1, 900), DayTime::at(1, 1700))])
    }

    fn friday_late() -> WeeklySchedule {
        WeeklySchedule::from_periods(vec![Period::new(DayTime::at(5, 2200), DayTime::at(6, 200))])
    }

    #[test]
    fn absent_or_empty_schedule_is_closed() {
        for day in 0..7 {
            for time in [0, 930, 1200, 2359] {
                assert!(!is_open_now(None, instant(day, time)));
                assert!(!is_open_now(Some(&WeeklySchedule::new()), instant(day, time)));
            }
        }
    }

    #[test]
    fn same_day_hours() {
        let schedule = weekday_nine_to_five();
        assert!(is_open_now(Some(&schedule), instant(1, 1000)));
        assert!(!is_open_now(Some(&schedule), instant(1, 800)));
        assert!(!is_open_now(Some(&schedule), instant(1, 1700)));
    }

    #[test]
    fn overnight_hours() {
        let schedule = friday_late();
        assert!(is_open_now(Some(&schedule), instant(5, 2300)));
        assert!(is_open_now(Some(&schedule), instant(6, 100)));
        assert!(!is_open_now(Some(&schedule), instant(6, 300)));
    }

    #[test]
    fn period_missing_open_time_is_ignored() {
        let schedule: WeeklySchedule = serde_json::from_str(
            r#"{"periods": [{"open": {"day": 1}, "close": {"day": 1, "time": "1700"}}]}"#,
        )
        .unwrap();
        assert_eq!(schedule.periods().len(), 1);
        assert!(!is_open_now(Some(&schedule), instant(1, 1000)));
        assert!(!is_open_now(Some(&schedule), instant(1, 1800)));
    }

    #[test]
    fn any_matching_period_opens_the_place() {
        let mut schedule = weekday_nine_to_five();
        schedule.add_period(Period::new(DayTime::at(3, 1100), DayTime::at(3, 1500)));
        schedule.add_period(Period::from_parts(Some(DayTime::at(4, 800)), None));
        assert!(is_open_now(Some(&schedule), instant(3, 1200)));
        assert!(is_open_now(Some(&schedule), instant(1, 1200)));
        assert!(!is_open_now(Some(&schedule), instant(4, 1200)));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let schedule = friday_late();
        let now = instant(6, 100);
        let first = is_open_now(Some(&schedule), now);
        let second = is_open_now(Some(&schedule), now);
        assert_eq!(first, second);
        assert_eq!(schedule, friday_late());
    }

    #[test]
    fn deserializes_places_payload() {
        let schedule: WeeklySchedule = serde_json::from_str(
            r#"{
                "open_now": true,
                "periods": [
                    {"open": {"day": 0, "time": "1000"}, "close": {"day": 0, "time": "1600"}},
                    {"open": {"day": 5, "time": "1800"}, "close": {"day": 6, "time": "0130"}},
                    "garbage",
                    {"open": {"day": 6, "time": "1800"}}
                ],
                "weekday_text": ["Sunday: 10:00 AM - 4:00 PM"]
            }"#,
        )
        .unwrap();
        assert_eq!(schedule.periods().len(), 4);
        assert_eq!(schedule.periods()[2], Period::default());
        assert!(schedule.is_open(instant(0, 1200)));
        assert!(schedule.is_open(instant(6, 100)));
        assert!(!schedule.is_open(instant(6, 1900)));
    }

    #[test]
    fn missing_or_malformed_periods_list_is_empty() {
        let schedule: WeeklySchedule = serde_json::from_str("{}").unwrap();
        assert!(schedule.is_empty());
        let schedule: WeeklySchedule = serde_json::from_str(r#"{"periods": "none"}"#).unwrap();
        assert!(schedule.is_empty());
        let schedule: WeeklySchedule = serde_json::from_str(r#"{"periods": null}"#).unwrap();
        assert!(schedule.is_empty());
    }
}
