#![forbid(unsafe_code)]

pub mod api;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod http;
pub mod settings_service;

pub use trainer_core::Clock;

pub use api::{
    BackendApi, HistoryRow, RecordQuestionRequest, ResultsResponse, SaveCategoryRequest,
    StartTestRequest, SubmitTestRequest, WrongQuestionDto,
};
pub use catalog::CategoryCatalog;
pub use controller::{AdvanceOutcome, FlagOutcome, TestController, TickOutcome};
pub use error::{
    ApiError, CategoryError, RecordError, ResultsFetchError, SettingsServiceError, StartTestError,
};
pub use http::HttpBackend;
pub use settings_service::SettingsService;
