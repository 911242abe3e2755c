//! Сетевые интерфейсы UPDU по стандартному IF-MIB.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collector::RawTable;
use crate::decoder::{DecodeError, EntityMap, Row, RowDecoder};
use crate::host::{CheckResult, InventoryRecord, Service, State, columns, tree_path};
use crate::snmp::{ColumnSpec, ParsePolicy, RNX_UPDU_DETECT, SnmpSection, TableSchema};

pub const IF_INDEX: &str = "if_index";
pub const IF_DESCR: &str = "description";
pub const IF_TYPE: &str = "type";
pub const IF_MTU: &str = "mtu";
pub const IF_SPEED: &str = "speed";
pub const IF_ADMIN_STATUS: &str = "admin_status";
pub const IF_OPER_STATUS: &str = "oper_status";
pub const IF_IN_DISCARDS: &str = "in_discards";
pub const IF_IN_ERRORS: &str = "in_errors";
pub const IF_OUT_DISCARDS: &str = "out_discards";
pub const IF_OUT_ERRORS: &str = "out_errors";

/// ifTable: статусные колонки с подстановкой значения по умолчанию
pub const IF_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::integer("1", IF_INDEX, ParsePolicy::Fallback(0)),
    ColumnSpec::text("2", IF_DESCR),
    ColumnSpec::integer("3", IF_TYPE, ParsePolicy::Fallback(1)),
    ColumnSpec::integer("4", IF_MTU, ParsePolicy::Fallback(1500)),
    ColumnSpec::integer("5", IF_SPEED, ParsePolicy::Fallback(0)),
    ColumnSpec::integer("7", IF_ADMIN_STATUS, ParsePolicy::Fallback(1)),
    ColumnSpec::integer("8", IF_OPER_STATUS, ParsePolicy::Fallback(1)),
];

pub static INTERFACE_SECTION: SnmpSection = SnmpSection {
    name: "rnx_updu_interfaces_section",
    detect: RNX_UPDU_DETECT,
    fetch: &[TableSchema {
        name: "if_table",
        base: ".1.3.6.1.2.1.2.2.1",
        columns: IF_COLUMNS,
    }],
};

/// Название типа интерфейса по ifType
const INTERFACE_TYPES: &[(u64, &str)] = &[
    (1, "Other"),
    (6, "Ethernet"),
    (24, "Software Loopback"),
    (117, "Gigabit Ethernet"),
    (131, "10 Gigabit Ethernet"),
    (161, "2.5 Gigabit Ethernet"),
    (162, "5 Gigabit Ethernet"),
];

const ADMIN_STATUSES: &[(u64, &str)] = &[(1, "up"), (2, "down"), (3, "testing")];

const OPER_STATUSES: &[(u64, &str)] = &[
    (1, "up"),
    (2, "down"),
    (3, "testing"),
    (4, "unknown"),
    (5, "dormant"),
    (6, "notPresent"),
    (7, "lowerLayerDown"),
];

const ADMIN_DOWN: u64 = 2;
const OPER_UP: u64 = 1;
const OPER_DOWN: u64 = 2;
const OPER_LOWER_LAYER_DOWN: u64 = 7;

fn lookup(table: &[(u64, &'static str)], code: u64) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

pub fn interface_type_name(code: u64) -> String {
    lookup(INTERFACE_TYPES, code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Type {}", code))
}

pub fn admin_status_name(code: u64) -> &'static str {
    lookup(ADMIN_STATUSES, code).unwrap_or("unknown")
}

pub fn oper_status_name(code: u64) -> &'static str {
    lookup(OPER_STATUSES, code).unwrap_or("unknown")
}

/// Скорость в читаемом виде: Gbps от 1e9, Mbps от 1e6, иначе Kbps
pub fn speed_string(speed: u64) -> String {
    if speed >= 1_000_000_000 {
        format!("{} Gbps", speed / 1_000_000_000)
    } else if speed >= 1_000_000 {
        format!("{} Mbps", speed / 1_000_000)
    } else if speed > 0 {
        format!("{} Kbps", speed / 1000)
    } else {
        "Unknown".to_string()
    }
}

/// Состояние сервиса по паре (ifAdminStatus, ifOperStatus).
/// Административно выключенный интерфейс всегда OK.
pub fn interface_state(admin_status: u64, oper_status: u64) -> (State, String) {
    if admin_status == ADMIN_DOWN {
        return (State::Ok, "administratively down".to_string());
    }

    match oper_status {
        OPER_UP => (State::Ok, "up".to_string()),
        OPER_DOWN => (State::Crit, "down".to_string()),
        OPER_LOWER_LAYER_DOWN => (State::Warn, "lower layer down".to_string()),
        _ => (
            State::Unknown,
            format!(
                "unknown state (admin: {}, oper: {})",
                admin_status, oper_status
            ),
        ),
    }
}

/// Один интерфейс из ifTable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub index: u64,
    pub description: String,
    pub if_type: u64,
    pub mtu: u64,
    pub speed: u64,
    pub admin_status: u64,
    pub oper_status: u64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub in_discards: u64,
    pub out_discards: u64,
}

impl InterfaceRecord {
    fn from_row(row: &Row<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            index: row.unsigned(IF_INDEX)?,
            description: row.text_or_empty(IF_DESCR).trim().to_string(),
            if_type: row.unsigned(IF_TYPE)?,
            mtu: row.unsigned(IF_MTU)?,
            speed: row.unsigned(IF_SPEED)?,
            admin_status: row.unsigned(IF_ADMIN_STATUS)?,
            oper_status: row.unsigned(IF_OPER_STATUS)?,
            in_errors: optional_counter(row, IF_IN_ERRORS)?,
            out_errors: optional_counter(row, IF_OUT_ERRORS)?,
            in_discards: optional_counter(row, IF_IN_DISCARDS)?,
            out_discards: optional_counter(row, IF_OUT_DISCARDS)?,
        })
    }
}

/// Счётчики ошибок читаются, только если схема их объявляет
fn optional_counter(row: &Row<'_>, field: &str) -> Result<u64, DecodeError> {
    if row.schema().has(field) {
        row.unsigned(field)
    } else {
        Ok(0)
    }
}

/// Интерфейсы по ключу `if_{index}`
pub type InterfaceSection = EntityMap<InterfaceRecord>;

/// Пороги для счётчиков ошибок и отброшенных пакетов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceParams {
    pub error_threshold: u64,
    pub discard_threshold: u64,
}

impl Default for InterfaceParams {
    fn default() -> Self {
        Self {
            error_threshold: 100,
            discard_threshold: 100,
        }
    }
}

/// Плагин интерфейсов
pub struct InterfacePlugin;

impl InterfacePlugin {
    pub const NAME: &'static str = "rnx_updu_interfaces";
    pub const SERVICE_NAME: &'static str = "Interface %s";

    pub fn parse(tables: &[RawTable]) -> Result<InterfaceSection, DecodeError> {
        Self::parse_with(&INTERFACE_SECTION, tables)
    }

    /// Разбор по произвольной схеме ifTable, например с колонками ошибок
    pub fn parse_with(
        section: &SnmpSection,
        tables: &[RawTable],
    ) -> Result<InterfaceSection, DecodeError> {
        let decoder = RowDecoder::new(section);
        decoder.check_shape(tables)?;

        let mut interfaces = InterfaceSection::default();
        for row in decoder.rows(tables, 0)? {
            let record = InterfaceRecord::from_row(&row)?;
            // Ключ строится по ifIndex как есть, до подстановки значения по умолчанию
            let key = format!("if_{}", row.text(IF_INDEX)?);
            debug!(
                key = %key,
                description = %record.description,
                admin = record.admin_status,
                oper = record.oper_status,
                "интерфейс разобран"
            );
            interfaces.insert(key, record);
        }

        debug!(count = interfaces.len(), "интерфейсы разобраны");
        Ok(interfaces)
    }

    pub fn validate() -> anyhow::Result<()> {
        INTERFACE_SECTION.validate()
    }

    /// Сервис интерфейса называется по ifDescr, пустое описание заменяется ключом
    fn item<'s>(key: &'s str, record: &'s InterfaceRecord) -> &'s str {
        if record.description.is_empty() {
            key
        } else {
            &record.description
        }
    }

    pub fn discover(section: &InterfaceSection) -> Vec<Service> {
        section
            .iter()
            .map(|(key, record)| Service::new(Self::item(key, record)))
            .collect()
    }

    pub fn service_name(item: &str) -> String {
        Self::SERVICE_NAME.replace("%s", item)
    }

    pub fn check(item: &str, params: &InterfaceParams, section: &InterfaceSection) -> Vec<CheckResult> {
        let Some(record) = section
            .iter()
            .find(|(key, record)| Self::item(key, record) == item)
            .map(|(_, record)| record)
        else {
            return vec![CheckResult::new(
                State::Unknown,
                format!("Interface {} not found", item),
            )];
        };

        let (state, status) = interface_state(record.admin_status, record.oper_status);
        let mut results = vec![CheckResult::new(state, format!("Status: {}", status))];

        if record.speed > 0 {
            results.push(CheckResult::new(
                State::Ok,
                format!("Speed: {}", speed_string(record.speed)),
            ));
        }
        if record.mtu > 0 {
            results.push(CheckResult::new(State::Ok, format!("MTU: {}", record.mtu)));
        }

        if let Some(result) = counter_result(
            "Errors",
            record.in_errors,
            record.out_errors,
            params.error_threshold,
        ) {
            results.push(result);
        }
        if let Some(result) = counter_result(
            "Discards",
            record.in_discards,
            record.out_discards,
            params.discard_threshold,
        ) {
            results.push(result);
        }

        results
    }

    /// Строки networking.interfaces
    pub fn inventory(section: &InterfaceSection) -> Vec<InventoryRecord> {
        section
            .values()
            .map(|record| InventoryRecord::TableRow {
                path: tree_path(&["networking", "interfaces"]),
                key_columns: columns([("index", record.index.to_string())]),
                inventory_columns: columns([
                    ("description", record.description.clone()),
                    ("type", interface_type_name(record.if_type)),
                    ("speed", speed_string(record.speed)),
                    ("mtu", record.mtu.to_string()),
                    ("admin_status", admin_status_name(record.admin_status).to_string()),
                    ("oper_status", oper_status_name(record.oper_status).to_string()),
                    ("speed_bps", record.speed.to_string()),
                    ("interface_type_num", record.if_type.to_string()),
                ]),
            })
            .collect()
    }
}

/// WARN ниже порога, CRIT начиная с порога, ничего при нулевых счётчиках
fn counter_result(label: &str, inbound: u64, outbound: u64, threshold: u64) -> Option<CheckResult> {
    if inbound == 0 && outbound == 0 {
        return None;
    }

    let state = if inbound.saturating_add(outbound) < threshold {
        State::Warn
    } else {
        State::Crit
    };
    Some(CheckResult::new(
        state,
        format!("{}: {} in, {} out", label, inbound, outbound),
    ))
}
