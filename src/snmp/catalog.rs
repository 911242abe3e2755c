use std::collections::HashSet;

use anyhow::{Context, Result};

use super::device_profiles::Detect;
use super::oid::{column_oid, parse_oid};

/// Что делать, если значение в колонке не разбирается как число
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsePolicy {
    /// Ошибка декодирования всей секции
    Strict,
    /// Подставить значение по умолчанию
    Fallback(i64),
}

/// Тип значения в колонке
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Text,
    /// Код качества данных "0" / "1" / "2"
    Quality,
    Integer(ParsePolicy),
    /// Число с плавающей точкой, делится на `divisor` (мА -> А и т.п.)
    Number { divisor: f64, policy: ParsePolicy },
}

/// Одна колонка SNMP таблицы
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub oid: &'static str,
    pub field: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn text(oid: &'static str, field: &'static str) -> Self {
        Self {
            oid,
            field,
            kind: ColumnKind::Text,
        }
    }

    pub const fn quality(oid: &'static str, field: &'static str) -> Self {
        Self {
            oid,
            field,
            kind: ColumnKind::Quality,
        }
    }

    pub const fn integer(oid: &'static str, field: &'static str, policy: ParsePolicy) -> Self {
        Self {
            oid,
            field,
            kind: ColumnKind::Integer(policy),
        }
    }

    /// Показание счётчика: без защиты от мусора, мусор должен ронять разбор
    pub const fn metering(oid: &'static str, field: &'static str, divisor: f64) -> Self {
        Self {
            oid,
            field,
            kind: ColumnKind::Number {
                divisor,
                policy: ParsePolicy::Strict,
            },
        }
    }
}

/// Схема SNMP таблицы: базовый OID и упорядоченный список колонок.
///
/// Одна и та же схема описывает и что запрашивать у устройства, и как
/// раскладывать строки при разборе, поэтому порядок колонок задаётся ровно
/// в одном месте.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSchema {
    pub name: &'static str,
    pub base: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSchema {
    /// Количество колонок в строке
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Позиция и описание колонки по имени поля
    pub fn column(&self, field: &str) -> Option<(usize, &ColumnSpec)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.field == field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.column(field).is_some()
    }

    /// Полные OID колонок в порядке объявления
    pub fn column_oids(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column_oid(self.base, column.oid))
            .collect()
    }

    /// Проверяет, что все OID разбираются и имена полей не повторяются
    pub fn validate(&self) -> Result<()> {
        parse_oid(self.base).context(format!("Таблица '{}': плохой базовый OID", self.name))?;

        if self.columns.is_empty() {
            anyhow::bail!("Таблица '{}' не содержит колонок", self.name);
        }

        let mut seen = HashSet::new();
        for full_oid in self.column_oids() {
            parse_oid(&full_oid)
                .context(format!("Таблица '{}': плохой OID колонки", self.name))?;
        }
        for column in self.columns {
            if !seen.insert(column.field) {
                anyhow::bail!(
                    "Таблица '{}': поле '{}' объявлено дважды",
                    self.name,
                    column.field
                );
            }
        }

        Ok(())
    }
}

/// SNMP секция: правило активации и список таблиц в порядке выборки
#[derive(Debug, Clone, Copy)]
pub struct SnmpSection {
    pub name: &'static str,
    pub detect: Detect,
    pub fetch: &'static [TableSchema],
}

impl SnmpSection {
    pub fn table(&self, index: usize) -> Option<&TableSchema> {
        self.fetch.get(index)
    }

    /// Декларация выборки: имя таблицы и OID её колонок
    pub fn fetch_oids(&self) -> Vec<(&'static str, Vec<String>)> {
        self.fetch
            .iter()
            .map(|table| (table.name, table.column_oids()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.is_empty() {
            anyhow::bail!("Секция '{}' не запрашивает ни одной таблицы", self.name);
        }
        for table in self.fetch {
            table
                .validate()
                .context(format!("Секция '{}'", self.name))?;
        }
        Ok(())
    }
}
