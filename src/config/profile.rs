use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::host::{ElphaseParams, LevelsParams};
use crate::plugins::interfaces::InterfaceParams;
use crate::plugins::power::{POWER_IN_COMBINED_PLUGIN, POWER_IN_PLUGIN, POWER_OUT_PLUGIN};

/// Профиль проверок: параметры оператора поверх значений по умолчанию.
///
/// Ключи совпадают с именами плагинов, отсутствующий ключ означает
/// пороги по умолчанию.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String, // Название профиля, например "rnx-updu" или "datacenter-a"
    #[serde(rename = "rnx_updu_power_in")]
    pub power_in: ElphaseParams,
    #[serde(rename = "rnx_updu_power_in_combined")]
    pub power_in_combined: ElphaseParams,
    #[serde(rename = "rnx_updu_power_out")]
    pub power_out: ElphaseParams,
    #[serde(rename = "rnx_updu_temperature")]
    pub temperature: LevelsParams,
    #[serde(rename = "rnx_updu_humidity")]
    pub humidity: LevelsParams,
    #[serde(rename = "rnx_updu_interfaces")]
    pub interfaces: InterfaceParams,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            power_in: ElphaseParams::default(),
            power_in_combined: ElphaseParams::default(),
            power_out: ElphaseParams::default(),
            temperature: LevelsParams::default(),
            humidity: LevelsParams::default(),
            interfaces: InterfaceParams::default(),
        }
    }
}

impl Profile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Не удалось прочитать файл: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let profile: Profile = serde_yml::from_str(content).context("Не удалось распарсить YAML")?;

        if profile.name.trim().is_empty() {
            anyhow::bail!("У профиля нет имени");
        }

        Ok(profile)
    }

    /// Пороги оператора для проверки фазы по имени плагина
    pub fn elphase(&self, plugin: &str) -> ElphaseParams {
        match plugin {
            name if name == POWER_IN_PLUGIN.name => self.power_in,
            name if name == POWER_IN_COMBINED_PLUGIN.name => self.power_in_combined,
            name if name == POWER_OUT_PLUGIN.name => self.power_out,
            _ => ElphaseParams::default(),
        }
    }
}
