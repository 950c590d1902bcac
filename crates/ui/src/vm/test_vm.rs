use std::sync::Arc;

use services::api::BackendApi;
use services::{AdvanceOutcome, Clock, FlagOutcome, TestController, TickOutcome};
use trainer_core::model::{Screen, TestConfig, TestReport};

use crate::views::ViewError;
use crate::vm::time_fmt::{format_mmss, format_secs, moving_average};

/// What the test screen should do after an event was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Continue,
    Completed,
}

/// Progress line on the test screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    pub current_question: u32,
    pub total_questions: u32,
    pub answered: u32,
    pub wrong_flagged: u32,
}

/// One row of the per-question breakdown on the results screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRowVm {
    pub question: u32,
    pub time_label: String,
    pub trend_label: String,
}

/// One flagged question listed under the results breakdown.
#[derive(Clone, Debug, PartialEq)]
pub struct WrongRowVm {
    pub question: u32,
    pub category: String,
    pub subcategory: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultsVm {
    pub test_type: String,
    pub completed: u32,
    pub total: u32,
    pub completion_pct: u32,
    pub total_time_label: String,
    pub average_label: String,
    pub rows: Vec<ResultRowVm>,
    pub wrong_rows: Vec<WrongRowVm>,
}

/// Window for the pace trend shown next to per-question times.
const TREND_WINDOW: usize = 3;

impl ResultsVm {
    #[must_use]
    pub fn from_report(report: &TestReport, wrong_rows: Vec<WrongRowVm>) -> Self {
        let times = &report.question_times;
        let trend = moving_average(times, TREND_WINDOW);
        let rows = times
            .iter()
            .zip(trend.iter())
            .enumerate()
            .map(|(idx, (time, avg))| ResultRowVm {
                question: u32::try_from(idx).unwrap_or(u32::MAX).saturating_add(1),
                time_label: format_secs(*time),
                trend_label: format_secs(*avg),
            })
            .collect();
        let average = if times.is_empty() {
            0.0
        } else {
            report.total_time_secs / times.len() as f64
        };

        Self {
            test_type: report.test_type.clone(),
            completed: report.completed_questions,
            total: report.total_questions,
            completion_pct: (report.completion_ratio() * 100.0).round() as u32,
            total_time_label: format_mmss(report.total_time_secs.round() as u32),
            average_label: format_secs(average),
            rows,
            wrong_rows,
        }
    }
}

/// View-model for one test attempt, from setup through results.
///
/// Thin wrapper over the session controller; everything async goes through
/// it so the view only ever juggles one owned value inside a signal.
pub struct TestVm {
    controller: TestController,
}

impl TestVm {
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>, clock: Clock) -> Self {
        Self {
            controller: TestController::new(api).with_clock(clock),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.controller.screen()
    }

    #[must_use]
    pub fn progress(&self) -> Option<ProgressVm> {
        let progress = self.controller.session()?.progress();
        Some(ProgressVm {
            current_question: progress.current_question,
            total_questions: progress.total_questions,
            answered: u32::try_from(progress.answered).unwrap_or(u32::MAX),
            wrong_flagged: u32::try_from(progress.wrong_flagged).unwrap_or(u32::MAX),
        })
    }

    /// Countdown label, clamped at `0:00`.
    #[must_use]
    pub fn remaining_label(&self) -> String {
        format_mmss(self.controller.remaining_secs().unwrap_or(0))
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the backend refuses to open a test.
    pub async fn start(&mut self, config: TestConfig) -> Result<(), ViewError> {
        self.controller
            .start(config)
            .await
            .map_err(|_| ViewError::Unknown)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for backend failures.
    pub async fn advance(&mut self) -> Result<TestOutcome, ViewError> {
        let outcome = self
            .controller
            .advance()
            .await
            .map_err(|_| ViewError::Unknown)?;
        Ok(match outcome {
            AdvanceOutcome::Finished => TestOutcome::Completed,
            AdvanceOutcome::Next { .. } | AdvanceOutcome::Skipped => TestOutcome::Continue,
        })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for backend failures or blank categories.
    pub async fn flag_wrong(
        &mut self,
        category: &str,
        subcategory: &str,
    ) -> Result<TestOutcome, ViewError> {
        let outcome = self
            .controller
            .flag_wrong(category, subcategory)
            .await
            .map_err(|_| ViewError::Unknown)?;
        Ok(match outcome {
            FlagOutcome::Advanced(AdvanceOutcome::Finished) => TestOutcome::Completed,
            _ => TestOutcome::Continue,
        })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the expiry submission fails.
    pub async fn tick(&mut self) -> Result<TestOutcome, ViewError> {
        let outcome = self.controller.tick().await.map_err(|_| ViewError::Unknown)?;
        Ok(match outcome {
            TickOutcome::Expired => TestOutcome::Completed,
            TickOutcome::Remaining(_) | TickOutcome::Skipped => TestOutcome::Continue,
        })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the submission fails.
    pub async fn end_now(&mut self) -> Result<TestOutcome, ViewError> {
        self.controller
            .end_now()
            .await
            .map_err(|_| ViewError::Unknown)?;
        Ok(TestOutcome::Completed)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the results fetch fails.
    pub async fn load_results(&mut self) -> Result<ResultsVm, ViewError> {
        let report = self
            .controller
            .load_results()
            .await
            .map_err(|_| ViewError::Unknown)?;
        let wrong_rows = self
            .controller
            .session()
            .map(|session| {
                session
                    .wrong_questions()
                    .iter()
                    .map(|wrong| WrongRowVm {
                        question: wrong.question(),
                        category: wrong.category().to_string(),
                        subcategory: wrong.subcategory().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(ResultsVm::from_report(&report, wrong_rows))
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use services::ApiError;
    use services::api::{
        BackendApi, HistoryRow, RecordQuestionRequest, RecordQuestionResponse, ResultsResponse,
        SaveCategoryRequest, SaveCategoryResponse, StartTestRequest, StartTestResponse,
        SubmitTestRequest, SubmitTestResponse,
    };
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use trainer_core::model::{TestConfigDraft, TestId, TestType};
    use trainer_core::time::fixed_clock;

    struct StubBackend;

    #[async_trait]
    impl BackendApi for StubBackend {
        async fn start_test(&self, _req: &StartTestRequest) -> Result<StartTestResponse, ApiError> {
            Ok(StartTestResponse {
                test_id: TestId::new("stub"),
            })
        }

        async fn record_question(
            &self,
            req: &RecordQuestionRequest,
        ) -> Result<RecordQuestionResponse, ApiError> {
            Ok(RecordQuestionResponse {
                success: true,
                current_question: req.question_number + 1,
                completed: false,
            })
        }

        async fn submit_test(
            &self,
            req: &SubmitTestRequest,
        ) -> Result<SubmitTestResponse, ApiError> {
            Ok(SubmitTestResponse {
                test_id: req.test_id.clone(),
            })
        }

        async fn get_results(&self, _id: &TestId) -> Result<ResultsResponse, ApiError> {
            Ok(ResultsResponse {
                test_type: "multiplication".to_string(),
                completed_questions: 2,
                total_questions: 2,
                total_time: 10.0,
                question_times: vec![4.0, 6.0],
                is_guest: true,
            })
        }

        async fn categories(&self) -> Result<BTreeMap<String, Vec<String>>, ApiError> {
            Ok(BTreeMap::new())
        }

        async fn save_category(
            &self,
            _req: &SaveCategoryRequest,
        ) -> Result<SaveCategoryResponse, ApiError> {
            Ok(SaveCategoryResponse { success: true })
        }

        async fn history(&self) -> Result<Vec<HistoryRow>, ApiError> {
            Ok(Vec::new())
        }
    }

    struct FlakyResultsBackend {
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl BackendApi for FlakyResultsBackend {
        async fn start_test(&self, req: &StartTestRequest) -> Result<StartTestResponse, ApiError> {
            StubBackend.start_test(req).await
        }

        async fn record_question(
            &self,
            req: &RecordQuestionRequest,
        ) -> Result<RecordQuestionResponse, ApiError> {
            StubBackend.record_question(req).await
        }

        async fn submit_test(
            &self,
            req: &SubmitTestRequest,
        ) -> Result<SubmitTestResponse, ApiError> {
            StubBackend.submit_test(req).await
        }

        async fn get_results(&self, id: &TestId) -> Result<ResultsResponse, ApiError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
            }
            StubBackend.get_results(id).await
        }

        async fn categories(&self) -> Result<BTreeMap<String, Vec<String>>, ApiError> {
            StubBackend.categories().await
        }

        async fn save_category(
            &self,
            req: &SaveCategoryRequest,
        ) -> Result<SaveCategoryResponse, ApiError> {
            StubBackend.save_category(req).await
        }

        async fn history(&self) -> Result<Vec<HistoryRow>, ApiError> {
            StubBackend.history().await
        }
    }

    fn config(total: u32) -> TestConfig {
        TestConfigDraft {
            test_type: TestType::Multiplication,
            total_questions: total,
            time_limit_secs: 120,
            auto_advance_on_wrong: false,
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn full_run_reaches_results() {
        let mut vm = TestVm::new(Arc::new(StubBackend), fixed_clock());
        assert_eq!(vm.screen(), Screen::Setup);

        vm.start(config(2)).await.unwrap();
        assert_eq!(vm.screen(), Screen::Test);

        assert_eq!(vm.advance().await.unwrap(), TestOutcome::Continue);
        assert_eq!(vm.advance().await.unwrap(), TestOutcome::Completed);
        assert_eq!(vm.screen(), Screen::Results);

        let results = vm.load_results().await.unwrap();
        assert_eq!(results.completed, 2);
        assert_eq!(results.completion_pct, 100);
        assert_eq!(results.rows.len(), 2);
        assert_eq!(results.rows[0].time_label, "4.0s");

        vm.reset();
        assert_eq!(vm.screen(), Screen::Setup);
    }

    #[tokio::test]
    async fn flagged_questions_show_up_in_results() {
        let mut vm = TestVm::new(Arc::new(StubBackend), fixed_clock());
        vm.start(config(2)).await.unwrap();

        vm.flag_wrong("Algebra", "Functions").await.unwrap();
        vm.advance().await.unwrap();
        vm.advance().await.unwrap();

        let results = vm.load_results().await.unwrap();
        assert_eq!(results.wrong_rows.len(), 1);
        assert_eq!(results.wrong_rows[0].question, 1);
        assert_eq!(results.wrong_rows[0].category, "Algebra");
    }

    #[tokio::test]
    async fn failed_results_fetch_can_be_retried() {
        let backend = Arc::new(FlakyResultsBackend {
            fail_next: AtomicBool::new(true),
        });
        let mut vm = TestVm::new(backend, fixed_clock());
        vm.start(config(1)).await.unwrap();
        assert_eq!(vm.advance().await.unwrap(), TestOutcome::Completed);

        assert!(vm.load_results().await.is_err());
        // The submitted attempt survives the failed fetch.
        assert_eq!(vm.screen(), Screen::Results);

        let results = vm.load_results().await.unwrap();
        assert_eq!(results.completed, 2);
    }

    #[test]
    fn results_vm_handles_empty_times() {
        let report = TestReport {
            test_id: TestId::new("t"),
            test_type: "mixed".to_string(),
            completed_questions: 0,
            total_questions: 20,
            total_time_secs: 60.0,
            question_times: Vec::new(),
            is_guest: true,
        };
        let vm = ResultsVm::from_report(&report, Vec::new());
        assert_eq!(vm.completion_pct, 0);
        assert_eq!(vm.total_time_label, "1:00");
        assert!(vm.rows.is_empty());
        assert_eq!(vm.average_label, "0.0s");
    }
}
