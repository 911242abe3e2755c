use crate::host::State;

/// Качество данных канала измерения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataQuality {
    Good,
    /// Данные устарели, но показание сохраняется
    Expired,
    /// Канал не лицензирован или не подключён, записи нет
    NoData,
}

impl DataQuality {
    /// Разбирает код "0" / "1" / "2"
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(DataQuality::Good),
            "1" => Some(DataQuality::Expired),
            "2" => Some(DataQuality::NoData),
            _ => None,
        }
    }

    pub fn state(self) -> State {
        match self {
            DataQuality::Good => State::Ok,
            DataQuality::Expired => State::Warn,
            DataQuality::NoData => State::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataQuality::Good => "OK",
            DataQuality::Expired => "Expired",
            DataQuality::NoData => "No Data",
        }
    }
}
