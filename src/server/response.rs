use serde::Serialize;

use crate::timing::{instant::EvaluationInstant, status::OpenStatus};

/// The body sent back for /api/status.
///
/// `label` is what the place card renders, `evaluated_at` is the instant that was actually
/// used, which matters when the server sampled the clock on the caller's behalf.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    open: bool,
    status: OpenStatus,
    label: &'static str,
    evaluated_at: EvaluationInstant,
}

impl StatusResponse {
    pub fn new(status: OpenStatus, evaluated_at: EvaluationInstant) -> Self {
        Self {
            open: status.is_open(),
            status,
            label: status.label(),
            evaluated_at,
        }
    }

    pub fn open(&self) -> bool {
        self.open
    }

    pub fn evaluated_at(&self) -> EvaluationInstant {
        self.evaluated_at
    }
}

/// The body sent back for /api/now.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NowResponse {
    timezone: String,
    #[serde(flatten)]
    instant: EvaluationInstant,
}

impl NowResponse {
    pub fn new(timezone: String, instant: EvaluationInstant) -> Self {
        Self { timezone, instant }
    }
}
