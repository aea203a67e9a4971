//! Opening-hours evaluation for places returned by the travel-data API.
//!
//! The core is [`timing::schedule::is_open_now`], a pure predicate over a place's weekly
//! periods and an explicit [`timing::instant::EvaluationInstant`]. The [`server`] module puts
//! it behind a small HTTP endpoint so the front end can render "Open Now" / "Closed".

pub mod config;
pub mod error;
pub mod server;
pub mod timing;

pub use timing::{
    instant::EvaluationInstant,
    period::{DayTime, Period},
    schedule::{is_open_now, WeeklySchedule},
    status::OpenStatus,
};
