use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{SettingsRepository, StorageError};
use trainer_core::model::{UserSettings, UserSettingsDraft};

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<UserSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT theme, sound_enabled
            FROM user_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let theme: String = row
            .try_get("theme")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let sound_enabled: i64 = row
            .try_get("sound_enabled")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        UserSettingsDraft {
            theme: Some(theme),
            sound_enabled: Some(sound_enabled != 0),
        }
        .validate()
        .map(Some)
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_settings (id, theme, sound_enabled)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                theme = excluded.theme,
                sound_enabled = excluded.sound_enabled
            ",
        )
        .bind(1_i64)
        .bind(settings.theme().as_str())
        .bind(i64::from(settings.sound_enabled()))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
