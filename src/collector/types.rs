use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snmp::normalize_oid;

/// Одна строка SNMP таблицы: значения колонок в порядке схемы
pub type RawRow = Vec<String>;

/// Все строки одной таблицы (одного поддерева)
pub type RawTable = Vec<RawRow>;

/// Результат одного цикла опроса, подготовленный внешним коллектором
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Скалярные значения по OID, например sysDescr
    #[serde(default)]
    pub scalars: BTreeMap<String, String>,
    /// Таблицы каждой секции в порядке объявления выборки
    #[serde(default)]
    pub sections: BTreeMap<String, Vec<RawTable>>,
}

impl Snapshot {
    /// Значение скаляра, OID сравниваются без учёта ведущей точки
    pub fn scalar(&self, oid: &str) -> Option<&str> {
        let wanted = normalize_oid(oid);
        self.scalars
            .iter()
            .find(|(key, _)| normalize_oid(key) == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// Таблицы секции, если коллектор их прислал
    pub fn tables(&self, section: &str) -> Option<&[RawTable]> {
        self.sections.get(section).map(Vec::as_slice)
    }

    pub fn total_rows(&self) -> usize {
        self.sections
            .values()
            .flat_map(|tables| tables.iter())
            .map(Vec::len)
            .sum()
    }
}
