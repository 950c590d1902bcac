use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of practice test offered by the setup screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Multiplication,
    Arithmetic,
    Mixed,
}

impl TestType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Multiplication => "multiplication",
            TestType::Arithmetic => "arithmetic",
            TestType::Mixed => "mixed",
        }
    }

    /// Human-readable label for dropdowns and report headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TestType::Multiplication => "Multiplication",
            TestType::Arithmetic => "Arithmetic",
            TestType::Mixed => "Mixed",
        }
    }

    #[must_use]
    pub fn all() -> &'static [TestType] {
        &[TestType::Multiplication, TestType::Arithmetic, TestType::Mixed]
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTestTypeError {
    raw: String,
}

impl fmt::Display for ParseTestTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown test type: {}", self.raw)
    }
}

impl std::error::Error for ParseTestTypeError {}

impl FromStr for TestType {
    type Err = ParseTestTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiplication" => Ok(TestType::Multiplication),
            "arithmetic" => Ok(TestType::Arithmetic),
            "mixed" => Ok(TestType::Mixed),
            other => Err(ParseTestTypeError { raw: other.to_string() }),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestConfigError {
    #[error("question count must be between {min} and {max}")]
    QuestionCountOutOfRange { min: u32, max: u32 },

    #[error("time limit must be at least {min} seconds")]
    TimeLimitTooShort { min: u32 },
}

const MIN_QUESTIONS: u32 = 1;
const MAX_QUESTIONS: u32 = 500;
const MIN_TIME_LIMIT_SECS: u32 = 10;

/// Unvalidated setup-form input.
#[derive(Clone, Debug)]
pub struct TestConfigDraft {
    pub test_type: TestType,
    pub total_questions: u32,
    pub time_limit_secs: u32,
    pub auto_advance_on_wrong: bool,
}

impl TestConfigDraft {
    /// Validate the draft into a config the session controller accepts.
    ///
    /// # Errors
    ///
    /// Returns `TestConfigError` when the question count or time limit
    /// falls outside the accepted range.
    pub fn validate(self) -> Result<TestConfig, TestConfigError> {
        if self.total_questions < MIN_QUESTIONS || self.total_questions > MAX_QUESTIONS {
            return Err(TestConfigError::QuestionCountOutOfRange {
                min: MIN_QUESTIONS,
                max: MAX_QUESTIONS,
            });
        }
        if self.time_limit_secs < MIN_TIME_LIMIT_SECS {
            return Err(TestConfigError::TimeLimitTooShort {
                min: MIN_TIME_LIMIT_SECS,
            });
        }

        Ok(TestConfig {
            test_type: self.test_type,
            total_questions: self.total_questions,
            time_limit_secs: self.time_limit_secs,
            auto_advance_on_wrong: self.auto_advance_on_wrong,
        })
    }
}

/// Validated parameters for one test attempt.
///
/// `auto_advance_on_wrong` decides whether flagging a question as wrong also
/// performs the advance bookkeeping. The default is false: flagging records
/// metadata for the current question and a separate Advance moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestConfig {
    test_type: TestType,
    total_questions: u32,
    time_limit_secs: u32,
    auto_advance_on_wrong: bool,
}

impl TestConfig {
    #[must_use]
    pub fn test_type(&self) -> TestType {
        self.test_type
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn auto_advance_on_wrong(&self) -> bool {
        self.auto_advance_on_wrong
    }
}
