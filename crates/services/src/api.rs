//! Wire contract for the backend test API.
//!
//! The request/response shapes mirror what the backend actually speaks,
//! casing included, so every DTO carries explicit serde renames. Domain
//! types stay on the other side of the conversion helpers below.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use trainer_core::model::{HistoryEntry, TestId, TestReport, TestType, WrongQuestion};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct StartTestRequest {
    #[serde(rename = "testType")]
    pub test_type: TestType,
    #[serde(rename = "numQuestions")]
    pub num_questions: u32,
    /// Time limit in whole minutes; the backend converts to seconds.
    #[serde(rename = "timeLimit")]
    pub time_limit_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartTestResponse {
    pub test_id: TestId,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrongDataDto {
    pub category: String,
    pub subcategory: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordQuestionRequest {
    pub test_id: TestId,
    pub question_number: u32,
    /// Seconds elapsed since the test started, fractional.
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrong_data: Option<WrongDataDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordQuestionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub current_question: u32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrongQuestionDto {
    pub question: u32,
    pub category: String,
    pub subcategory: String,
}

impl From<&WrongQuestion> for WrongQuestionDto {
    fn from(value: &WrongQuestion) -> Self {
        Self {
            question: value.question(),
            category: value.category().to_string(),
            subcategory: value.subcategory().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitTestRequest {
    #[serde(rename = "testId")]
    pub test_id: TestId,
    pub times: Vec<f64>,
    #[serde(rename = "wrongQuestions")]
    pub wrong_questions: Vec<WrongQuestionDto>,
    #[serde(rename = "totalQuestions")]
    pub total_questions: u32,
    #[serde(rename = "completedQuestions")]
    pub completed_questions: u32,
    #[serde(rename = "totalTime")]
    pub total_time: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTestResponse {
    pub test_id: TestId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsResponse {
    pub test_type: String,
    pub completed_questions: u32,
    pub total_questions: u32,
    /// Total attempt time in seconds.
    pub total_time: f64,
    pub question_times: Vec<f64>,
    #[serde(default)]
    pub is_guest: bool,
}

impl ResultsResponse {
    #[must_use]
    pub fn into_report(self, test_id: TestId) -> TestReport {
        TestReport {
            test_id,
            test_type: self.test_type,
            completed_questions: self.completed_questions,
            total_questions: self.total_questions,
            total_time_secs: self.total_time,
            question_times: self.question_times,
            is_guest: self.is_guest,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveCategoryRequest {
    #[serde(rename = "testId")]
    pub test_id: TestId,
    #[serde(rename = "questionNumber")]
    pub question_number: u32,
    #[serde(rename = "mainCategory")]
    pub main_category: String,
    #[serde(rename = "subCategory")]
    pub sub_category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCategoryResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRow {
    pub id: i64,
    pub test_type: String,
    pub total_questions: u32,
    pub completed_questions: u32,
    pub total_time: f64,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub date_taken: String,
}

impl HistoryRow {
    /// Convert the wire row into a domain history entry.
    ///
    /// # Errors
    ///
    /// Returns `chrono::ParseError` when `date_taken` is malformed.
    pub fn into_entry(self) -> Result<HistoryEntry, chrono::ParseError> {
        let date_taken = NaiveDateTime::parse_from_str(&self.date_taken, "%Y-%m-%d %H:%M:%S")?
            .and_utc();
        Ok(HistoryEntry {
            id: self.id,
            test_type: self.test_type,
            total_questions: self.total_questions,
            completed_questions: self.completed_questions,
            total_time_secs: self.total_time,
            date_taken,
        })
    }
}

/// Client contract for the backend test API.
///
/// One method per REST call; `HttpBackend` is the real implementation and
/// tests provide mocks.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Open a new test and receive its id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn start_test(&self, req: &StartTestRequest) -> Result<StartTestResponse, ApiError>;

    /// Record a single completed question.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn record_question(
        &self,
        req: &RecordQuestionRequest,
    ) -> Result<RecordQuestionResponse, ApiError>;

    /// Submit the whole attempt and receive the canonical results id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn submit_test(&self, req: &SubmitTestRequest) -> Result<SubmitTestResponse, ApiError>;

    /// Fetch canonical results for a submitted test.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn get_results(&self, id: &TestId) -> Result<ResultsResponse, ApiError>;

    /// Fetch the category taxonomy as a category -> subcategories map.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn categories(&self) -> Result<BTreeMap<String, Vec<String>>, ApiError>;

    /// Tag a question of an existing test with a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn save_category(
        &self,
        req: &SaveCategoryRequest,
    ) -> Result<SaveCategoryResponse, ApiError>;

    /// List past tests for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-success statuses.
    async fn history(&self) -> Result<Vec<HistoryRow>, ApiError>;
}
