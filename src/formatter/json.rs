use serde::{Deserialize, Serialize};

use crate::host::{CheckResult, InventoryRecord, State};
use crate::plugins::{MonitoringResult, ServiceResult};

/// JSON структура для отдачи платформе мониторинга
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringResultJson {
    pub device_type: String,
    pub description: String,
    pub timestamp: String,
    pub summary: ResultSummary,
    pub services: Vec<ServiceResultJson>,
    pub inventory: Vec<InventoryRecord>,
    pub errors: Vec<ErrorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_services: usize,
    pub ok: usize,
    pub warn: usize,
    pub crit: usize,
    pub unknown: usize,
    pub inventory_records: usize,
    pub failed_sections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResultJson {
    pub plugin: String,
    pub service: String,
    pub item: String,
    pub state: State,
    /// Итоговая строка: summary всех результатов через запятую
    pub summary: String,
    pub results: Vec<CheckResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub item_type: String, // "section"
    pub item_name: String,
    pub error_message: String,
}

/// JSON форматтер для результатов мониторинга
pub struct JsonFormatter;

impl JsonFormatter {
    /// Конвертирует результат мониторинга в JSON
    pub fn format_monitoring_result(result: &MonitoringResult) -> MonitoringResultJson {
        let timestamp = chrono::Utc::now().to_rfc3339();

        MonitoringResultJson {
            device_type: result.device.device_type.clone(),
            description: result.device.description.clone(),
            timestamp,
            summary: Self::summarize(result),
            services: result.services.iter().map(Self::format_service).collect(),
            inventory: result.inventory.clone(),
            errors: Self::extract_errors(result),
        }
    }

    fn summarize(result: &MonitoringResult) -> ResultSummary {
        let mut summary = ResultSummary {
            total_services: result.services.len(),
            inventory_records: result.inventory.len(),
            failed_sections: result.failures.len(),
            ..Default::default()
        };

        for service in &result.services {
            match service.state {
                State::Ok => summary.ok += 1,
                State::Warn => summary.warn += 1,
                State::Crit => summary.crit += 1,
                State::Unknown => summary.unknown += 1,
            }
        }

        summary
    }

    /// Форматирует сервис для JSON
    fn format_service(service: &ServiceResult) -> ServiceResultJson {
        let summary = service
            .results
            .iter()
            .map(|result| result.summary.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        ServiceResultJson {
            plugin: service.plugin.to_string(),
            service: service.service.clone(),
            item: service.item.clone(),
            state: service.state,
            summary,
            results: service.results.clone(),
        }
    }

    /// Извлекает ошибки из результата
    fn extract_errors(result: &MonitoringResult) -> Vec<ErrorInfo> {
        result
            .failures
            .iter()
            .map(|failure| ErrorInfo {
                item_type: "section".to_string(),
                item_name: failure.section.to_string(),
                error_message: failure.error.clone(),
            })
            .collect()
    }

    /// Сериализует результат в JSON строку
    pub fn to_json_string(result: &MonitoringResult) -> anyhow::Result<String> {
        let json_result = Self::format_monitoring_result(result);
        serde_json::to_string_pretty(&json_result)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }

    /// Сериализует результат в компактный JSON
    pub fn to_json_compact(result: &MonitoringResult) -> anyhow::Result<String> {
        let json_result = Self::format_monitoring_result(result);
        serde_json::to_string(&json_result)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }
}
