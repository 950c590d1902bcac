use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{TestConfig, TestId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already finished")]
    Finished,

    #[error("category must not be empty")]
    EmptyCategory,
}

//
// ─── SCREEN ────────────────────────────────────────────────────────────────────
//

/// The three mutually exclusive screens of the test flow.
///
/// Derived from controller state rather than stored, so exactly one screen
/// is ever active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Test,
    Results,
}

//
// ─── WRONG QUESTIONS ───────────────────────────────────────────────────────────
//

/// One question flagged as answered incorrectly, with its taxonomy tag.
///
/// Immutable once created; a repeat flag for the same question number
/// replaces the earlier entry (last write wins).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrongQuestion {
    question: u32,
    category: String,
    subcategory: String,
}

impl WrongQuestion {
    #[must_use]
    pub fn question(&self) -> u32 {
        self.question
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub current_question: u32,
    pub total_questions: u32,
    pub answered: usize,
    pub wrong_flagged: usize,
    pub is_finished: bool,
}

/// Result of an advance step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the given question number.
    Next { question: u32 },
    /// The advanced question was the last one; the session is now finished.
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state for one timed test attempt.
///
/// Pure state machine: every time-dependent operation takes `now` from the
/// caller's clock, which keeps the timing rules deterministic under test.
/// Question numbering is 1-based; per-question time is the wall-clock delta
/// between two consecutive advances (or start to first advance), stored in
/// fractional seconds.
pub struct Session {
    test_id: TestId,
    config: TestConfig,
    started_at: DateTime<Utc>,
    question_started_at: DateTime<Utc>,
    current_question: u32,
    question_times: Vec<f64>,
    wrong_questions: Vec<WrongQuestion>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session for a test the backend has already opened.
    #[must_use]
    pub fn new(test_id: TestId, config: TestConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            test_id,
            config,
            started_at,
            question_started_at: started_at,
            current_question: 1,
            question_times: Vec::new(),
            wrong_questions: Vec::new(),
            finished_at: None,
        }
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// 1-based number of the question currently on screen.
    #[must_use]
    pub fn current_question(&self) -> u32 {
        self.current_question
    }

    /// Per-question times recorded so far, in fractional seconds.
    #[must_use]
    pub fn question_times(&self) -> &[f64] {
        &self.question_times
    }

    #[must_use]
    pub fn wrong_questions(&self) -> &[WrongQuestion] {
        &self.wrong_questions
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            current_question: self.current_question,
            total_questions: self.config.total_questions(),
            answered: self.question_times.len(),
            wrong_flagged: self.wrong_questions.len(),
            is_finished: self.is_finished(),
        }
    }

    /// Whole seconds elapsed since the session started.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        let end = self.finished_at.unwrap_or(now);
        let millis = (end - self.started_at).num_milliseconds().max(0);
        u32::try_from(millis / 1000).unwrap_or(u32::MAX)
    }

    /// Seconds left on the countdown, saturating at zero so the display
    /// never goes negative.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        self.config
            .time_limit_secs()
            .saturating_sub(self.elapsed_secs(now))
    }

    /// Total wall-clock time of the attempt in fractional seconds.
    #[must_use]
    pub fn total_time_secs(&self, now: DateTime<Utc>) -> f64 {
        let end = self.finished_at.unwrap_or(now);
        (end - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Mark the current question as done and move to the next one.
    ///
    /// Records the time since the previous advance (or since start for
    /// question 1). Advancing past the last question finishes the session;
    /// exactly one `Advance::Finished` is ever produced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` once the session is over, so a
    /// stray extra advance cannot record anything.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }

        let elapsed = (now - self.question_started_at).num_milliseconds().max(0) as f64 / 1000.0;
        self.question_times.push(elapsed);

        if self.current_question >= self.config.total_questions() {
            self.finished_at = Some(now);
            return Ok(Advance::Finished);
        }

        self.current_question += 1;
        self.question_started_at = now;
        Ok(Advance::Next {
            question: self.current_question,
        })
    }

    /// Flag the current question as wrong with a category/subcategory tag.
    ///
    /// Never moves `current_question`; flagging the same question twice
    /// replaces the earlier entry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` after completion and
    /// `SessionError::EmptyCategory` when the category is blank.
    pub fn flag_wrong(
        &mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Result<&WrongQuestion, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        let category = category.into();
        if category.trim().is_empty() {
            return Err(SessionError::EmptyCategory);
        }

        let entry = WrongQuestion {
            question: self.current_question,
            category,
            subcategory: subcategory.into(),
        };

        let idx = match self
            .wrong_questions
            .iter()
            .position(|w| w.question == entry.question)
        {
            Some(idx) => {
                self.wrong_questions[idx] = entry;
                idx
            }
            None => {
                self.wrong_questions.push(entry);
                self.wrong_questions.len() - 1
            }
        };

        Ok(&self.wrong_questions[idx])
    }

    /// Force the session to end, e.g. when the countdown reaches zero or
    /// the user presses the end key. Only completed questions keep their
    /// recorded times.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if the session is already over,
    /// which makes a leaked timer tick harmless.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        self.finished_at = Some(now);
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("test_id", &self.test_id)
            .field("current_question", &self.current_question)
            .field("recorded", &self.question_times.len())
            .field("wrong", &self.wrong_questions.len())
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
