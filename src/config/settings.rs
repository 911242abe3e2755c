use serde::{Deserialize, Serialize};

/// Базовые настройки приложения
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Откуда читать снапшот
    pub input: InputSettings,
    /// Как печатать отчёт
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSettings {
    /// Путь к снапшоту внешнего коллектора (YAML или JSON)
    pub snapshot: String,
    /// Профиль проверок
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Компактный JSON в одну строку вместо форматированного
    pub compact: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: InputSettings {
                snapshot: "./snapshots/rnx-updu.yaml".to_string(),
                profile: "./profiles/rnx-updu.yaml".to_string(),
            },
            output: OutputSettings { compact: false },
        }
    }
}
