//! Типы, которыми плагины обмениваются с платформой мониторинга:
//! обнаруженные сервисы, результаты проверок и записи инвентаря.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod levels;

pub use levels::{ElphaseParams, Levels, LevelsParams};

/// Состояние сервиса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    /// Худшее из двух состояний: OK < WARN < UNKNOWN < CRIT
    pub fn worst(self, other: State) -> State {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Худшее состояние из набора результатов, OK для пустого набора
    pub fn worst_of<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> State {
        results
            .into_iter()
            .fold(State::Ok, |acc, result| acc.worst(result.state))
    }

    fn severity(self) -> u8 {
        match self {
            State::Ok => 0,
            State::Warn => 1,
            State::Unknown => 2,
            State::Crit => 3,
        }
    }
}

/// Обнаруженный сервис
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub item: String,
}

impl Service {
    pub fn new(item: impl Into<String>) -> Self {
        Self { item: item.into() }
    }
}

/// Метрика для графиков
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfData {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Levels>,
}

/// Один результат проверки
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub state: State,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<PerfData>,
}

impl CheckResult {
    pub fn new(state: State, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
            metric: None,
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64, levels: Option<Levels>) -> Self {
        self.metric = Some(PerfData {
            name: name.to_string(),
            value,
            levels,
        });
        self
    }

    /// Единственный результат для сервиса, которого нет в секции
    pub fn item_not_found(item: &str) -> Self {
        Self::new(State::Unknown, format!("Item {} not found", item))
    }
}

/// Запись инвентаря: набор атрибутов узла или строка таблицы
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryRecord {
    Attributes {
        path: Vec<String>,
        attributes: BTreeMap<String, String>,
    },
    TableRow {
        path: Vec<String>,
        key_columns: BTreeMap<String, String>,
        inventory_columns: BTreeMap<String, String>,
    },
}

impl InventoryRecord {
    pub fn path(&self) -> &[String] {
        match self {
            InventoryRecord::Attributes { path, .. } | InventoryRecord::TableRow { path, .. } => path,
        }
    }
}

/// Собирает путь в дереве инвентаря: `tree_path(&["hardware", "system"])`
pub fn tree_path(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Собирает колонки записи инвентаря из пар ключ-значение
pub fn columns<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crit_outranks_unknown() {
        assert_eq!(State::Ok.worst(State::Warn), State::Warn);
        assert_eq!(State::Warn.worst(State::Unknown), State::Unknown);
        assert_eq!(State::Unknown.worst(State::Crit), State::Crit);
        assert_eq!(State::Crit.worst(State::Unknown), State::Crit);
    }

    #[test]
    fn worst_of_empty_is_ok() {
        assert_eq!(State::worst_of(&Vec::<CheckResult>::new()), State::Ok);

        let results = vec![
            CheckResult::new(State::Ok, "a"),
            CheckResult::new(State::Warn, "b"),
        ];
        assert_eq!(State::worst_of(&results), State::Warn);
    }

    #[test]
    fn state_serializes_uppercase() {
        let json = serde_json::to_string(&CheckResult::new(State::Crit, "down")).unwrap();
        assert_eq!(json, r#"{"state":"CRIT","summary":"down"}"#);
    }

    #[test]
    fn inventory_record_is_tagged() {
        let record = InventoryRecord::TableRow {
            path: tree_path(&["networking", "interfaces"]),
            key_columns: columns([("index", "1")]),
            inventory_columns: columns([("description", "eth0")]),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "table_row");
        assert_eq!(value["path"][1], "interfaces");
        assert_eq!(record.path(), ["networking", "interfaces"]);
    }
}
