use serde::Serialize;

use super::{
    instant::EvaluationInstant,
    schedule::{is_open_now, WeeklySchedule},
};

/// What a place card shows next to the name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenStatus {
    Open,
    Closed,
}

impl OpenStatus {
    pub fn evaluate(schedule: Option<&WeeklySchedule>, now: EvaluationInstant) -> Self {
        if is_open_now(schedule, now) {
            OpenStatus::Open
        } else {
            OpenStatus::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, OpenStatus::Open)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpenStatus::Open => "Open Now",
            OpenStatus::Closed => "Closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::period::{DayTime, Period};

    #[test]
    fn labels_follow_evaluation() {
        let schedule =
            WeeklySchedule::from_periods(vec![Period::new(DayTime::at(2, 700), DayTime::at(2, 1900))]);
        let open = OpenStatus::evaluate(Some(&schedule), EvaluationInstant::new(2, 1200).unwrap());
        let closed = OpenStatus::evaluate(Some(&schedule), EvaluationInstant::new(2, 2000).unwrap());

        assert!(open.is_open());
        assert_eq!(open.label(), "Open Now");
        assert!(!closed.is_open());
        assert_eq!(closed.label(), "Closed");
    }

    #[test]
    fn unknown_hours_read_as_closed() {
        let status = OpenStatus::evaluate(None, EvaluationInstant::new(0, 1200).unwrap());
        assert_eq!(status, OpenStatus::Closed);
    }
}
