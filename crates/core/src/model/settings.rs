use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Visual theme applied to the whole window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UserSettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UserSettingsError::UnknownTheme {
                raw: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserSettingsError {
    #[error("unknown theme: {raw}")]
    UnknownTheme { raw: String },
}

/// Unvalidated settings-form input, e.g. raw values from storage.
#[derive(Clone, Debug, Default)]
pub struct UserSettingsDraft {
    pub theme: Option<String>,
    pub sound_enabled: Option<bool>,
}

impl UserSettingsDraft {
    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `UserSettingsError` if the theme string is unrecognised.
    pub fn validate(self) -> Result<UserSettings, UserSettingsError> {
        let theme = match self.theme {
            Some(raw) => raw.trim().parse()?,
            None => Theme::default(),
        };

        Ok(UserSettings {
            theme,
            sound_enabled: self.sound_enabled.unwrap_or(true),
        })
    }
}

/// Client-side preferences that survive across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserSettings {
    theme: Theme,
    sound_enabled: bool,
}

impl UserSettings {
    #[must_use]
    pub fn new(theme: Theme, sound_enabled: bool) -> Self {
        Self {
            theme,
            sound_enabled,
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            sound_enabled: true,
        }
    }
}
