use std::collections::BTreeMap;

use crate::host::State;

use super::quality::DataQuality;

/// Уровень оборудования, к которому относится запись
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Pdu,
    Inlet,
    Wire,
    Branch,
    Module,
    Outlet,
    ExternalSensor,
    Interface,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Pdu => "pdu",
            EntityKind::Inlet => "inlets",
            EntityKind::Wire => "wires",
            EntityKind::Branch => "branch",
            EntityKind::Module => "module",
            EntityKind::Outlet => "outlet",
            EntityKind::ExternalSensor => "external-sensor",
            EntityKind::Interface => "interface",
        }
    }
}

/// Нормализованная величина: ток в А, напряжение в В, мощность в Вт,
/// полная мощность в ВА, энергия в Вт*ч, температура в °C, влажность в %
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Voltage,
    Current,
    Power,
    ApparentPower,
    Energy,
    Temperature,
    Humidity,
}

impl Metric {
    pub fn key(self) -> &'static str {
        match self {
            Metric::Voltage => "voltage",
            Metric::Current => "current",
            Metric::Power => "power",
            Metric::ApparentPower => "appower",
            Metric::Energy => "energy",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

/// Разобранная запись одного канала измерения
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Отображаемое имя с пользовательским именем и описанием
    pub name: String,
    pub kind: EntityKind,
    /// Описание из колонки Description
    pub title: String,
    pub quality: DataQuality,
    pub metrics: BTreeMap<Metric, f64>,
}

impl Reading {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    pub fn state(&self) -> State {
        self.quality.state()
    }
}

/// Упорядоченное отображение ключ -> запись.
///
/// Порядок определяется первой вставкой ключа. Повторная вставка того же
/// ключа заменяет запись на месте: побеждает последняя строка.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for EntityMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> EntityMap<T> {
    /// Вставляет запись, возвращает вытесненную, если ключ уже был
    pub fn insert(&mut self, key: String, value: T) -> Option<T> {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Результат разбора секции за один цикл: группа -> записи
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    groups: BTreeMap<&'static str, EntityMap<Reading>>,
}

impl Section {
    pub fn insert_group(&mut self, name: &'static str, group: EntityMap<Reading>) {
        self.groups.insert(name, group);
    }

    pub fn group(&self, name: &str) -> Option<&EntityMap<Reading>> {
        self.groups.get(name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.keys().copied()
    }

    /// Общее число записей во всех группах
    pub fn len(&self) -> usize {
        self.groups.values().map(EntityMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
