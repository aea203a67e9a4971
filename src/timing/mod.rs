pub mod instant;
pub mod period;
pub mod schedule;
pub mod status;
