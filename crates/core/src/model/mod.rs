mod config;
mod ids;
mod report;
mod session;
mod settings;

pub use config::{ParseTestTypeError, TestConfig, TestConfigDraft, TestConfigError, TestType};
pub use ids::{ParseIdError, TestId};
pub use report::{HistoryEntry, TestReport};
pub use session::{Advance, Screen, Session, SessionError, SessionProgress, WrongQuestion};
pub use settings::{Theme, UserSettings, UserSettingsDraft, UserSettingsError};
