use serde::Serialize;

use crate::collector::Snapshot;

use super::oid::SYS_DESCR;

/// Префикс sysDescr, с которого начинается описание всех RNX UPDU
pub const RNX_UPDU_PREFIX: &str = "RNX UPDU";

/// Условие активации секции: значение OID начинается с префикса
pub const RNX_UPDU_DETECT: Detect = Detect::StartsWith {
    oid: SYS_DESCR,
    prefix: RNX_UPDU_PREFIX,
};

/// Информация об устройстве
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device_type: String,
    pub description: String,
}

/// Правило определения, относится ли устройство к секции
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detect {
    StartsWith {
        oid: &'static str,
        prefix: &'static str,
    },
}

impl Detect {
    /// Проверяет правило по скалярам снапшота
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        match self {
            Detect::StartsWith { oid, prefix } => snapshot
                .scalar(oid)
                .is_some_and(|value| value.starts_with(prefix)),
        }
    }
}

/// Детектор типа устройства
pub struct DeviceDetector;

impl DeviceDetector {
    /// Определяет тип устройства по sysDescr
    pub fn detect_device_type(sys_descr: &str) -> DeviceInfo {
        if sys_descr.starts_with(RNX_UPDU_PREFIX) {
            DeviceInfo {
                device_type: "rnx_updu".to_string(),
                description: sys_descr.trim().to_string(),
            }
        } else {
            DeviceInfo {
                device_type: "generic".to_string(),
                description: "Unknown Device".to_string(),
            }
        }
    }
}
