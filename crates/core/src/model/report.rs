use chrono::{DateTime, Utc};

use crate::model::TestId;

/// Canonical results for a submitted test, as returned by the backend.
///
/// The backend owns the durable copy; this is the client-side mirror
/// rendered on the results screen.
#[derive(Clone, Debug, PartialEq)]
pub struct TestReport {
    pub test_id: TestId,
    pub test_type: String,
    pub completed_questions: u32,
    pub total_questions: u32,
    pub total_time_secs: f64,
    pub question_times: Vec<f64>,
    pub is_guest: bool,
}

impl TestReport {
    /// Fraction of questions completed, in 0.0..=1.0.
    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.completed_questions) / f64::from(self.total_questions)
    }
}

/// One row of the per-user test history list.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub test_type: String,
    pub total_questions: u32,
    pub completed_questions: u32,
    pub total_time_secs: f64,
    pub date_taken: DateTime<Utc>,
}
