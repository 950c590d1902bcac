//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use trainer_core::model::{SessionError, UserSettingsError};

/// Transport-level failure talking to the backend test API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("backend request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Setup submission failed; the UI stays on the setup screen.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StartTestError {
    #[error("a test is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Config(#[from] trainer_core::model::TestConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A question record or final submission failed.
///
/// Local session state keeps the attempted mutation, so a retry re-sends a
/// superset of what the backend already has.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("no test is running")]
    NoSession,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The results page could not load canonical results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsFetchError {
    #[error("no submitted test to fetch results for")]
    NoSubmittedTest,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CategoryCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("backend rejected the category tag")]
    Rejected,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] UserSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
