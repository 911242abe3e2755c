use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

pub mod profile;
pub mod settings;

pub use profile::Profile;
pub use settings::Settings;

/// Главная конфигурация приложения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Профиль проверок
    pub profile: Profile,
    /// Базовые настройки
    pub settings: Settings,
}

impl AppConfig {
    /// Загружает конфигурацию из YAML файла профиля
    pub fn load(profile_path: impl AsRef<Path>) -> Result<Self> {
        let profile = Profile::load(profile_path)?;
        let settings = Settings::default();

        Ok(Self { profile, settings })
    }

    /// Профиль из UPDU_PROFILE или из пути по умолчанию. Если файла по
    /// умолчанию нет, используются пороги по умолчанию.
    pub fn from_env() -> Result<Self> {
        let settings = Settings::default();

        if let Ok(path) = env::var("UPDU_PROFILE") {
            return Self::load(path);
        }
        if Path::new(&settings.input.profile).exists() {
            return Self::load(&settings.input.profile);
        }

        debug!(path = %settings.input.profile, "профиль не найден, пороги по умолчанию");
        Ok(Self {
            profile: Profile::default(),
            settings,
        })
    }

    /// Получает путь к снапшоту из переменной окружения или из настроек
    pub fn get_snapshot_path(&self) -> String {
        env::var("UPDU_SNAPSHOT").unwrap_or_else(|_| self.settings.input.snapshot.clone())
    }

    /// UPDU_OUTPUT=compact включает компактный вывод
    pub fn is_compact(&self) -> bool {
        env::var("UPDU_OUTPUT")
            .map(|mode| mode.eq_ignore_ascii_case("compact"))
            .unwrap_or(self.settings.output.compact)
    }

    pub fn debug_config(&self) {
        info!(
            profile = %self.profile.name,
            snapshot = %self.get_snapshot_path(),
            compact = self.is_compact(),
            "конфигурация загружена"
        );
    }
}
