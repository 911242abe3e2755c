use crate::snmp::{ColumnKind, ColumnSpec, ParsePolicy, TableSchema};

use super::error::DecodeError;
use super::quality::DataQuality;

/// Строка таблицы с доступом к значениям по имени поля схемы
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'a TableSchema,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Ширина строки проверяется заранее в `RowDecoder::check_shape`
    pub fn new(schema: &'a TableSchema, cells: &'a [String]) -> Self {
        Self { schema, cells }
    }

    pub fn schema(&self) -> &'a TableSchema {
        self.schema
    }

    fn cell(&self, field: &str) -> Result<(&'a str, &'a ColumnSpec), DecodeError> {
        let (index, column) = self
            .schema
            .column(field)
            .ok_or_else(|| DecodeError::UnknownField {
                table: self.schema.name,
                field: field.to_string(),
            })?;

        let value = self
            .cells
            .get(index)
            .ok_or_else(|| DecodeError::ColumnCount {
                table: self.schema.name,
                row: 0,
                expected: self.schema.width(),
                actual: self.cells.len(),
            })?;

        Ok((value.as_str(), column))
    }

    /// Текстовое значение как есть
    pub fn text(&self, field: &str) -> Result<&'a str, DecodeError> {
        self.cell(field).map(|(value, _)| value)
    }

    /// Текст поля или пустая строка, если схема его не объявляет
    pub fn text_or_empty(&self, field: &str) -> &'a str {
        if self.schema.has(field) {
            self.text(field).unwrap_or_default()
        } else {
            ""
        }
    }

    pub fn quality(&self, field: &str) -> Result<DataQuality, DecodeError> {
        let (value, column) = self.cell(field)?;
        if column.kind != ColumnKind::Quality {
            return Err(self.wrong_kind(field));
        }

        DataQuality::from_code(value).ok_or_else(|| DecodeError::InvalidQuality {
            table: self.schema.name,
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    /// Целое значение. Для `Fallback` принимаются только цифры, всё
    /// остальное заменяется значением по умолчанию.
    pub fn integer(&self, field: &str) -> Result<i64, DecodeError> {
        let (value, column) = self.cell(field)?;
        let ColumnKind::Integer(policy) = column.kind else {
            return Err(self.wrong_kind(field));
        };

        match policy {
            ParsePolicy::Fallback(default) => Ok(parse_digits(value).unwrap_or(default)),
            ParsePolicy::Strict => value
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid_number(field, value)),
        }
    }

    /// Неотрицательное целое, отрицательные значения считаются нулём
    pub fn unsigned(&self, field: &str) -> Result<u64, DecodeError> {
        self.integer(field)
            .map(|value| u64::try_from(value).unwrap_or_default())
    }

    /// Число, приведённое к базовой единице делением на `divisor` колонки
    pub fn number(&self, field: &str) -> Result<f64, DecodeError> {
        let (value, column) = self.cell(field)?;
        let ColumnKind::Number { divisor, policy } = column.kind else {
            return Err(self.wrong_kind(field));
        };

        let raw = match value.trim().parse::<f64>() {
            Ok(raw) if raw.is_finite() => raw,
            _ => match policy {
                ParsePolicy::Fallback(default) => default as f64,
                ParsePolicy::Strict => return Err(self.invalid_number(field, value)),
            },
        };

        Ok(raw / divisor)
    }

    fn wrong_kind(&self, field: &str) -> DecodeError {
        DecodeError::WrongKind {
            table: self.schema.name,
            field: field.to_string(),
        }
    }

    fn invalid_number(&self, field: &str, value: &str) -> DecodeError {
        DecodeError::InvalidNumber {
            table: self.schema.name,
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Только ASCII цифры, как `str.isdigit` для значений SNMP
fn parse_digits(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}
