//! Общий разбор SNMP таблиц в записи показаний.
//!
//! Каждая группа секции собирается из одной или нескольких таблиц. Для
//! каждой строки проверяется качество данных, строки с NoData
//! отбрасываются, числа приводятся к базовым единицам, ключом записи
//! служит системное имя.

use anyhow::Context;
use tracing::debug;

use crate::collector::RawTable;
use crate::snmp::SnmpSection;

pub mod error;
pub mod naming;
pub mod quality;
pub mod row;
pub mod section;

pub use error::DecodeError;
pub use quality::DataQuality;
pub use row::Row;
pub use section::{EntityKind, EntityMap, Metric, Reading, Section};

/// Поле системного имени, общее для всех таблиц UPDU MIB
pub const SYSTEM_NAME: &str = "system_name";
pub const CUSTOM_NAME: &str = "custom_name";
pub const DESCRIPTION: &str = "description";
pub const PORT: &str = "port";

/// Как строится отображаемое имя записи
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// `PDU1 (Rack3) [desc]`
    System,
    /// `Sensor1 Temperature on E1 (Rack3) [desc]`
    OnPort(&'static str),
}

impl Naming {
    fn compose(&self, row: &Row<'_>) -> Result<String, DecodeError> {
        let system_name = row.text(SYSTEM_NAME)?;
        let base = match self {
            Naming::System => system_name.to_string(),
            Naming::OnPort(what) => format!("{} {} on {}", system_name, what, row.text(PORT)?),
        };

        Ok(naming::compose(
            base,
            row.text_or_empty(CUSTOM_NAME),
            row.text_or_empty(DESCRIPTION),
        ))
    }
}

/// Колонка, из которой берётся метрика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricField {
    pub field: &'static str,
    pub metric: Metric,
}

/// Как строка превращается в запись
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpec {
    /// Колонка с кодом качества, по которой решается судьба строки
    pub quality: &'static str,
    pub naming: Naming,
    pub metrics: &'static [MetricField],
}

impl RecordSpec {
    /// Все поля, которые запись читает обязательно
    fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = vec![SYSTEM_NAME, self.quality];
        if let Naming::OnPort(_) = self.naming {
            fields.push(PORT);
        }
        fields.extend(self.metrics.iter().map(|metric| metric.field));
        fields
    }
}

/// Группа секции: имя и таблицы-источники с типом оборудования
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: &'static str,
    pub sources: &'static [(usize, EntityKind)],
    pub record: RecordSpec,
}

/// Разборщик таблиц одной SNMP секции
pub struct RowDecoder<'a> {
    section: &'a SnmpSection,
}

impl<'a> RowDecoder<'a> {
    pub fn new(section: &'a SnmpSection) -> Self {
        Self { section }
    }

    /// Проверка при старте: OID разбираются, группы ссылаются на
    /// существующие таблицы и поля
    pub fn validate(&self, groups: &[GroupSpec]) -> anyhow::Result<()> {
        self.section.validate()?;

        for group in groups {
            for (index, _) in group.sources {
                let table = self.section.table(*index).with_context(|| {
                    format!(
                        "Группа '{}' ссылается на таблицу {}, которой нет в секции '{}'",
                        group.name, index, self.section.name
                    )
                })?;

                for field in group.record.required_fields() {
                    if !table.has(field) {
                        anyhow::bail!(
                            "Группа '{}': поле '{}' не объявлено в таблице '{}'",
                            group.name,
                            field,
                            table.name
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Количество таблиц и ширина каждой строки должны совпадать со схемой
    pub fn check_shape(&self, tables: &[RawTable]) -> Result<(), DecodeError> {
        if tables.len() != self.section.fetch.len() {
            return Err(DecodeError::TableCount {
                section: self.section.name,
                expected: self.section.fetch.len(),
                actual: tables.len(),
            });
        }

        for (schema, table) in self.section.fetch.iter().zip(tables) {
            for (row_index, row) in table.iter().enumerate() {
                if row.len() != schema.width() {
                    return Err(DecodeError::ColumnCount {
                        table: schema.name,
                        row: row_index,
                        expected: schema.width(),
                        actual: row.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Строки таблицы `index` с привязкой к её схеме
    pub fn rows<'t>(
        &self,
        tables: &'t [RawTable],
        index: usize,
    ) -> Result<Vec<Row<'t>>, DecodeError>
    where
        'a: 't,
    {
        let schema = self.section.table(index).ok_or(DecodeError::TableCount {
            section: self.section.name,
            expected: index + 1,
            actual: self.section.fetch.len(),
        })?;
        let table = tables.get(index).ok_or(DecodeError::TableCount {
            section: self.section.name,
            expected: self.section.fetch.len(),
            actual: tables.len(),
        })?;

        Ok(table.iter().map(|cells| Row::new(schema, cells)).collect())
    }

    /// Разбирает все группы секции
    pub fn decode(&self, tables: &[RawTable], groups: &[GroupSpec]) -> Result<Section, DecodeError> {
        self.check_shape(tables)?;

        let mut section = Section::default();
        for group in groups {
            let mut entities = EntityMap::default();

            for (index, kind) in group.sources {
                for row in self.rows(tables, *index)? {
                    let Some((key, reading)) = decode_row(&row, *kind, &group.record)? else {
                        continue;
                    };
                    if entities.insert(key.clone(), reading).is_some() {
                        debug!(group = group.name, key = %key, "запись перезаписана более поздней строкой");
                    }
                }
            }

            debug!(group = group.name, count = entities.len(), "группа разобрана");
            section.insert_group(group.name, entities);
        }

        if section.is_empty() {
            debug!(section = self.section.name, "в секции нет показаний");
        }
        debug!(
            section = self.section.name,
            groups = ?section.group_names().collect::<Vec<_>>(),
            readings = section.len(),
            "секция разобрана"
        );
        Ok(section)
    }
}

/// Одна строка -> ключ и запись, `None` для каналов без данных
fn decode_row(
    row: &Row<'_>,
    kind: EntityKind,
    record: &RecordSpec,
) -> Result<Option<(String, Reading)>, DecodeError> {
    let quality = row.quality(record.quality)?;
    let system_name = row.text(SYSTEM_NAME)?;
    let name = record.naming.compose(row)?;

    if quality == DataQuality::NoData {
        // канал не лицензирован или не подключён
        debug!(
            table = row.schema().name,
            kind = kind.label(),
            name = %name,
            "пропускаем запись: качество данных No Data"
        );
        return Ok(None);
    }

    let mut reading = Reading {
        name,
        kind,
        title: row.text_or_empty(DESCRIPTION).to_string(),
        quality,
        metrics: Default::default(),
    };
    for metric in record.metrics {
        reading.metrics.insert(metric.metric, row.number(metric.field)?);
    }

    Ok(Some((system_name.to_string(), reading)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::{ColumnSpec, RNX_UPDU_DETECT, TableSchema};

    const COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::text("2", SYSTEM_NAME),
        ColumnSpec::text("3", CUSTOM_NAME),
        ColumnSpec::quality("50", "quality"),
        ColumnSpec::metering("51", "current", 1000.0),
    ];

    static SECTION: SnmpSection = SnmpSection {
        name: "test_section",
        detect: RNX_UPDU_DETECT,
        fetch: &[
            TableSchema {
                name: "pdu",
                base: ".1.3.6.1.4.1.55108.2.1.2.1",
                columns: COLUMNS,
            },
            TableSchema {
                name: "inlet",
                base: ".1.3.6.1.4.1.55108.2.2.2.1",
                columns: COLUMNS,
            },
        ],
    };

    const RECORD: RecordSpec = RecordSpec {
        quality: "quality",
        naming: Naming::System,
        metrics: &[MetricField {
            field: "current",
            metric: Metric::Current,
        }],
    };

    const GROUPS: &[GroupSpec] = &[GroupSpec {
        name: "power_in",
        sources: &[(0, EntityKind::Pdu), (1, EntityKind::Inlet)],
        record: RECORD,
    }];

    fn table(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn folds_tables_into_one_group() {
        let tables = vec![
            table(&[&["PDU1", "Rack3", "0", "9500"]]),
            table(&[&["Inlet1", "", "1", "4200"], &["Inlet2", "", "2", "0"]]),
        ];

        let section = RowDecoder::new(&SECTION).decode(&tables, GROUPS).unwrap();
        let group = section.group("power_in").unwrap();

        assert_eq!(group.keys().collect::<Vec<_>>(), vec!["PDU1", "Inlet1"]);

        let pdu = group.get("PDU1").unwrap();
        assert_eq!(pdu.name, "PDU1 (Rack3)");
        assert_eq!(pdu.kind, EntityKind::Pdu);
        assert_eq!(pdu.metric(Metric::Current), Some(9.5));

        let inlet = group.get("Inlet1").unwrap();
        assert_eq!(inlet.quality, DataQuality::Expired);
        assert_eq!(inlet.state(), crate::host::State::Warn);
        assert!(group.get("Inlet2").is_none());
        assert_eq!(section.len(), 2);
        assert_eq!(EntityKind::Inlet.label(), "inlets");
    }

    #[test]
    fn later_table_overwrites_colliding_key() {
        let tables = vec![
            table(&[&["Main", "", "0", "1000"]]),
            table(&[&["Main", "", "0", "2000"]]),
        ];

        let section = RowDecoder::new(&SECTION).decode(&tables, GROUPS).unwrap();
        let group = section.group("power_in").unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.get("Main").unwrap().kind, EntityKind::Inlet);
        assert_eq!(group.get("Main").unwrap().metric(Metric::Current), Some(2.0));
    }

    #[test]
    fn decoding_is_repeatable() {
        let tables = vec![
            table(&[&["PDU1", "", "0", "9500"]]),
            table(&[&["Inlet1", "", "0", "4200"]]),
        ];
        let decoder = RowDecoder::new(&SECTION);
        assert_eq!(
            decoder.decode(&tables, GROUPS).unwrap(),
            decoder.decode(&tables, GROUPS).unwrap()
        );
    }

    #[test]
    fn no_data_rows_skip_metering_parse() {
        let tables = vec![table(&[&["PDU1", "", "2", "garbage"]]), table(&[])];
        let section = RowDecoder::new(&SECTION).decode(&tables, GROUPS).unwrap();
        assert!(section.group("power_in").unwrap().is_empty());
        assert!(section.is_empty());
        assert_eq!(section.group_names().collect::<Vec<_>>(), vec!["power_in"]);
    }

    #[test]
    fn malformed_metering_fails_the_section() {
        let tables = vec![table(&[&["PDU1", "", "0", "9.5A"]]), table(&[])];
        let err = RowDecoder::new(&SECTION).decode(&tables, GROUPS).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber { table: "pdu", .. }));
    }

    #[test]
    fn shape_mismatch_fails_fast() {
        let decoder = RowDecoder::new(&SECTION);

        let tables = vec![table(&[&["PDU1", "", "0", "9500"]])];
        assert!(matches!(
            decoder.decode(&tables, GROUPS),
            Err(DecodeError::TableCount { expected: 2, actual: 1, .. })
        ));

        let tables = vec![table(&[&["PDU1", "0", "9500"]]), table(&[])];
        assert!(matches!(
            decoder.decode(&tables, GROUPS),
            Err(DecodeError::ColumnCount { table: "pdu", row: 0, expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn validates_group_fields() {
        let decoder = RowDecoder::new(&SECTION);
        assert!(decoder.validate(GROUPS).is_ok());

        const PORT_GROUP: &[GroupSpec] = &[GroupSpec {
            name: "temperature",
            sources: &[(0, EntityKind::ExternalSensor)],
            record: RecordSpec {
                quality: "quality",
                naming: Naming::OnPort("Temperature"),
                metrics: &[],
            },
        }];
        assert!(decoder.validate(PORT_GROUP).is_err());

        const MISSING_TABLE: &[GroupSpec] = &[GroupSpec {
            name: "power_out",
            sources: &[(5, EntityKind::Outlet)],
            record: RECORD,
        }];
        assert!(decoder.validate(MISSING_TABLE).is_err());
    }
}
