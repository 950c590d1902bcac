use std::fmt;
use std::sync::Arc;

use trainer_core::Clock;
use trainer_core::model::{Advance, Screen, Session, TestConfig, TestId, TestReport};

use crate::api::{
    BackendApi, RecordQuestionRequest, StartTestRequest, SubmitTestRequest, WrongDataDto,
    WrongQuestionDto,
};
use crate::error::{RecordError, ResultsFetchError, StartTestError};

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of dispatching an Advance event into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The question was recorded and the given one is now on screen.
    Next { question: u32 },
    /// The last question was recorded; the attempt was submitted.
    Finished,
    /// The event was dropped: a request was still in flight, or the
    /// session was already over. Dropping keeps Advance idempotent after
    /// completion and serializes mutating calls.
    Skipped,
}

/// Result of flagging the current question as wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    /// Metadata recorded; an explicit Advance still has to move on.
    Recorded { question: u32 },
    /// Metadata recorded and, per `auto_advance_on_wrong`, the advance
    /// bookkeeping ran too.
    Advanced(AdvanceOutcome),
    Skipped,
}

/// Result of a 1 Hz timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Seconds left on the countdown.
    Remaining(u32),
    /// The countdown hit zero; the attempt was force-finished and
    /// submitted.
    Expired,
    /// Nothing to do: no running session, or a request in flight.
    Skipped,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives one practice-test attempt from setup through results.
///
/// Owns the in-memory [`Session`] exclusively; the backend keeps the durable
/// copy and the two are reconciled at submit/fetch boundaries. All mutating
/// calls are serialized by a single in-flight flag, so a second Advance
/// fired before the previous request resolves is dropped instead of racing.
pub struct TestController {
    api: Arc<dyn BackendApi>,
    clock: Clock,
    session: Option<Session>,
    result_id: Option<TestId>,
    report: Option<TestReport>,
    in_flight: bool,
}

impl TestController {
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            api,
            clock: Clock::default_clock(),
            session: None,
            result_id: None,
            report: None,
            in_flight: false,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Mutable clock handle; lets tests advance a fixed clock mid-session.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn report(&self) -> Option<&TestReport> {
        self.report.as_ref()
    }

    /// Which of the three screens should be visible.
    ///
    /// Derived, so exactly one screen is active at any time.
    #[must_use]
    pub fn screen(&self) -> Screen {
        if self.result_id.is_some() {
            Screen::Results
        } else if self.session.is_some() {
            Screen::Test
        } else {
            Screen::Setup
        }
    }

    /// Seconds left on the countdown for display.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        self.session
            .as_ref()
            .map(|s| s.remaining_secs(self.clock.now()))
    }

    /// Idle -> Running: open a test with the backend and start the session.
    ///
    /// The wire format carries the time limit in whole minutes, so a limit
    /// that is not a multiple of 60 seconds is rounded up for the backend
    /// while the countdown still enforces the exact seconds locally.
    ///
    /// # Errors
    ///
    /// Returns `StartTestError::AlreadyRunning` if a session exists, or the
    /// backend failure; on failure the controller stays on the setup screen.
    pub async fn start(&mut self, config: TestConfig) -> Result<(), StartTestError> {
        if self.session.is_some() {
            return Err(StartTestError::AlreadyRunning);
        }

        let req = StartTestRequest {
            test_type: config.test_type(),
            num_questions: config.total_questions(),
            time_limit_minutes: config.time_limit_secs().div_ceil(60),
        };
        let response = self.api.start_test(&req).await.map_err(|err| {
            tracing::warn!(error = %err, "start-test request failed");
            StartTestError::Api(err)
        })?;

        let now = self.clock.now();
        tracing::info!(test_id = %response.test_id, "test started");
        self.session = Some(Session::new(response.test_id, config, now));
        self.result_id = None;
        self.report = None;
        Ok(())
    }

    /// Dispatch an Advance event (space bar / button).
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NoSession` outside a test, or the backend
    /// failure. The local timing record is kept even when the backend call
    /// fails, so a retry re-sends a superset (at-least-once submission).
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, RecordError> {
        if self.in_flight || self.result_id.is_some() {
            return Ok(AdvanceOutcome::Skipped);
        }
        let Some(session) = self.session.as_ref() else {
            return Err(RecordError::NoSession);
        };
        if session.is_finished() {
            return Ok(AdvanceOutcome::Skipped);
        }

        self.in_flight = true;
        let result = self.advance_inner(None).await;
        self.in_flight = false;
        result
    }

    /// Dispatch a Flag-wrong event (W key / button).
    ///
    /// Records a wrong-question entry for the current question; when the
    /// config enables `auto_advance_on_wrong`, the advance bookkeeping runs
    /// in the same step with the tag attached to the question record.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NoSession` outside a test, session errors for
    /// blank categories, or the backend failure from the advance leg.
    pub async fn flag_wrong(
        &mut self,
        category: &str,
        subcategory: &str,
    ) -> Result<FlagOutcome, RecordError> {
        if self.in_flight || self.result_id.is_some() {
            return Ok(FlagOutcome::Skipped);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(RecordError::NoSession);
        };
        if session.is_finished() {
            return Ok(FlagOutcome::Skipped);
        }

        let entry = session.flag_wrong(category, subcategory)?;
        let question = entry.question();
        let auto_advance = session.config().auto_advance_on_wrong();

        if !auto_advance {
            return Ok(FlagOutcome::Recorded { question });
        }

        self.in_flight = true;
        let result = self
            .advance_inner(Some(WrongDataDto {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            }))
            .await;
        self.in_flight = false;
        result.map(FlagOutcome::Advanced)
    }

    /// Dispatch a 1 Hz timer tick.
    ///
    /// At zero the controller forces the same transition as completing the
    /// last question, exactly once: later ticks see a finished session and
    /// are dropped, so a leaked interval cannot end the test twice.
    ///
    /// # Errors
    ///
    /// Returns the backend failure from the submission leg.
    pub async fn tick(&mut self) -> Result<TickOutcome, RecordError> {
        if self.in_flight || self.result_id.is_some() {
            return Ok(TickOutcome::Skipped);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(TickOutcome::Skipped);
        };
        if session.is_finished() {
            return Ok(TickOutcome::Skipped);
        }

        let now = self.clock.now();
        let remaining = session.remaining_secs(now);
        if remaining > 0 {
            return Ok(TickOutcome::Remaining(remaining));
        }

        session.expire(now)?;
        self.in_flight = true;
        let result = self.submit().await;
        self.in_flight = false;
        result?;
        Ok(TickOutcome::Expired)
    }

    /// Force-end the attempt (E key), or retry a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NoSession` outside a test, or the backend
    /// failure from the submission.
    pub async fn end_now(&mut self) -> Result<(), RecordError> {
        if self.in_flight || self.result_id.is_some() {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Err(RecordError::NoSession);
        };
        if !session.is_finished() {
            session.expire(self.clock.now())?;
        }

        self.in_flight = true;
        let result = self.submit().await;
        self.in_flight = false;
        result
    }

    /// Results -> Idle: drop the session and go back to setup.
    pub fn reset(&mut self) {
        self.session = None;
        self.result_id = None;
        self.report = None;
        self.in_flight = false;
    }

    /// Fetch canonical results for the submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `ResultsFetchError::NoSubmittedTest` before submission, or
    /// the backend failure; prior state is untouched so the fetch can be
    /// retried.
    pub async fn load_results(&mut self) -> Result<TestReport, ResultsFetchError> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }
        let Some(result_id) = self.result_id.clone() else {
            return Err(ResultsFetchError::NoSubmittedTest);
        };

        let response = self.api.get_results(&result_id).await.map_err(|err| {
            tracing::warn!(test_id = %result_id, error = %err, "results fetch failed");
            err
        })?;
        let report = response.into_report(result_id);
        self.report = Some(report.clone());
        Ok(report)
    }

    async fn advance_inner(
        &mut self,
        wrong_data: Option<WrongDataDto>,
    ) -> Result<AdvanceOutcome, RecordError> {
        let Some(session) = self.session.as_mut() else {
            return Err(RecordError::NoSession);
        };

        let now = self.clock.now();
        let question = session.current_question();
        let advance = session.advance(now)?;
        let req = RecordQuestionRequest {
            test_id: session.test_id().clone(),
            question_number: question,
            time: session.total_time_secs(now),
            wrong_data,
        };

        if let Err(err) = self.api.record_question(&req).await {
            // Local state keeps the recorded time; the backend will see a
            // superset on the next successful call.
            tracing::warn!(question, error = %err, "record-question request failed");
            return Err(err.into());
        }

        match advance {
            Advance::Next { question } => Ok(AdvanceOutcome::Next { question }),
            Advance::Finished => {
                self.submit().await?;
                Ok(AdvanceOutcome::Finished)
            }
        }
    }

    /// Running -> Finishing -> Results: push the accumulated attempt.
    async fn submit(&mut self) -> Result<(), RecordError> {
        let Some(session) = self.session.as_ref() else {
            return Err(RecordError::NoSession);
        };

        let now = self.clock.now();
        let completed = u32::try_from(session.question_times().len()).unwrap_or(u32::MAX);
        let req = SubmitTestRequest {
            test_id: session.test_id().clone(),
            times: session.question_times().to_vec(),
            wrong_questions: session
                .wrong_questions()
                .iter()
                .map(WrongQuestionDto::from)
                .collect(),
            total_questions: session.config().total_questions(),
            completed_questions: completed,
            total_time: session.total_time_secs(now),
        };

        let response = self.api.submit_test(&req).await.map_err(|err| {
            tracing::warn!(test_id = %req.test_id, error = %err, "test submission failed");
            err
        })?;

        tracing::info!(test_id = %response.test_id, completed, "test submitted");
        self.result_id = Some(response.test_id);
        Ok(())
    }
}

impl fmt::Debug for TestController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestController")
            .field("screen", &self.screen())
            .field("session", &self.session)
            .field("result_id", &self.result_id)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
