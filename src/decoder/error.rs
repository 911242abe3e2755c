/// Ошибки разбора SNMP таблиц. Любая из них прерывает разбор секции
/// в текущем цикле, остальные секции продолжают работать.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("секция {section}: ожидалось таблиц {expected}, получено {actual}")]
    TableCount {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("таблица {table}, строка {row}: колонок {actual}, по схеме {expected}")]
    ColumnCount {
        table: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("таблица {table}: поле {field} не объявлено в схеме")]
    UnknownField {
        table: &'static str,
        field: String,
    },

    #[error("таблица {table}: поле {field} имеет другой тип")]
    WrongKind {
        table: &'static str,
        field: String,
    },

    #[error("таблица {table}: нечисловое значение {value:?} в поле {field}")]
    InvalidNumber {
        table: &'static str,
        field: String,
        value: String,
    },

    #[error("таблица {table}: неизвестный код качества {value:?} в поле {field}")]
    InvalidQuality {
        table: &'static str,
        field: String,
        value: String,
    },
}
