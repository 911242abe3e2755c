//! Питание: PDU, вводы, фазы, ветви, модули и розетки.

use crate::collector::RawTable;
use crate::decoder::{
    CUSTOM_NAME, DESCRIPTION, DecodeError, EntityKind, GroupSpec, Metric, MetricField, Naming,
    RecordSpec, RowDecoder, SYSTEM_NAME, Section,
};
use crate::host::levels::check_elphase;
use crate::host::{CheckResult, ElphaseParams, Service};
use crate::snmp::{ColumnSpec, RNX_UPDU_DETECT, SnmpSection, TableSchema};

pub const POWER_IN_COMBINED: &str = "power_in_combined";
pub const POWER_IN: &str = "power_in";
pub const POWER_OUT: &str = "power_out";

/// Колонки upduMib2<ObjectType>, одинаковые для всех уровней
const POWER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("2", SYSTEM_NAME),
    ColumnSpec::text("3", CUSTOM_NAME),
    ColumnSpec::text("4", DESCRIPTION),
    ColumnSpec::quality("50", "quality"),
    ColumnSpec::metering("51", "current", 1000.0),
    ColumnSpec::metering("52", "voltage", 1000.0),
    ColumnSpec::metering("53", "power", 1.0),
    ColumnSpec::metering("54", "appower", 1.0),
    ColumnSpec::metering("56", "energy", 1.0),
];

const fn power_table(name: &'static str, base: &'static str) -> TableSchema {
    TableSchema {
        name,
        base,
        columns: POWER_COLUMNS,
    }
}

pub static POWER_SECTION: SnmpSection = SnmpSection {
    name: "rnx_updu_section_power",
    detect: RNX_UPDU_DETECT,
    fetch: &[
        power_table("pdu", ".1.3.6.1.4.1.55108.2.1.2.1"),
        power_table("inlet", ".1.3.6.1.4.1.55108.2.2.2.1"),
        power_table("wire", ".1.3.6.1.4.1.55108.2.4.2.1"),
        power_table("branch", ".1.3.6.1.4.1.55108.2.5.2.1"),
        power_table("module", ".1.3.6.1.4.1.55108.2.8.2.1"),
        power_table("outlet", ".1.3.6.1.4.1.55108.2.9.2.1"),
    ],
};

const POWER_RECORD: RecordSpec = RecordSpec {
    quality: "quality",
    naming: Naming::System,
    metrics: &[
        MetricField {
            field: "current",
            metric: Metric::Current,
        },
        MetricField {
            field: "voltage",
            metric: Metric::Voltage,
        },
        MetricField {
            field: "power",
            metric: Metric::Power,
        },
        MetricField {
            field: "appower",
            metric: Metric::ApparentPower,
        },
        MetricField {
            field: "energy",
            metric: Metric::Energy,
        },
    ],
};

pub const POWER_GROUPS: &[GroupSpec] = &[
    GroupSpec {
        name: POWER_IN_COMBINED,
        sources: &[(0, EntityKind::Pdu), (1, EntityKind::Inlet)],
        record: POWER_RECORD,
    },
    GroupSpec {
        name: POWER_IN,
        sources: &[(2, EntityKind::Wire)],
        record: POWER_RECORD,
    },
    GroupSpec {
        name: POWER_OUT,
        sources: &[
            (3, EntityKind::Branch),
            (4, EntityKind::Module),
            (5, EntityKind::Outlet),
        ],
        record: POWER_RECORD,
    },
];

/// Проверка фазы над одной группой секции
#[derive(Debug, Clone, Copy)]
pub struct ElphasePlugin {
    pub name: &'static str,
    pub group: &'static str,
    pub service_name: &'static str,
    pub ruleset: &'static str,
    pub defaults: ElphaseParams,
}

pub const POWER_IN_PLUGIN: ElphasePlugin = ElphasePlugin {
    name: "rnx_updu_power_in",
    group: POWER_IN,
    service_name: "%s",
    ruleset: "el_inphase",
    defaults: ElphaseParams {
        voltage: Some((200.0, 195.0)),
        power: Some((2000.0, 3000.0)),
        appower: Some((2200.0, 3300.0)),
        current: Some((9.0, 3.0)),
    },
};

pub const POWER_IN_COMBINED_PLUGIN: ElphasePlugin = ElphasePlugin {
    name: "rnx_updu_power_in_combined",
    group: POWER_IN_COMBINED,
    service_name: "%s",
    ruleset: "el_inphase",
    defaults: ElphaseParams {
        voltage: Some((200.0, 195.0)),
        power: Some((6000.0, 9000.0)),
        appower: Some((6600.0, 9900.0)),
        current: Some((27.0, 30.0)),
    },
};

pub const POWER_OUT_PLUGIN: ElphasePlugin = ElphasePlugin {
    name: "rnx_updu_power_out",
    group: POWER_OUT,
    service_name: "%s",
    ruleset: "ups_outphase",
    defaults: ElphaseParams {
        voltage: Some((200.0, 195.0)),
        power: Some((2000.0, 3000.0)),
        appower: Some((2500.0, 3300.0)),
        current: Some((9.0, 10.0)),
    },
};

pub const ELPHASE_PLUGINS: [ElphasePlugin; 3] =
    [POWER_IN_PLUGIN, POWER_IN_COMBINED_PLUGIN, POWER_OUT_PLUGIN];

/// Плагин питания
pub struct PowerPlugin;

impl PowerPlugin {
    /// Разбирает шесть таблиц питания в группы power_in_combined,
    /// power_in и power_out
    pub fn parse(tables: &[RawTable]) -> Result<Section, DecodeError> {
        RowDecoder::new(&POWER_SECTION).decode(tables, POWER_GROUPS)
    }

    pub fn validate() -> anyhow::Result<()> {
        RowDecoder::new(&POWER_SECTION).validate(POWER_GROUPS)
    }
}

impl ElphasePlugin {
    /// Один сервис на каждую запись группы, в порядке разбора
    pub fn discover(&self, section: &Section) -> Vec<Service> {
        section
            .group(self.group)
            .map(|group| group.keys().map(Service::new).collect())
            .unwrap_or_default()
    }

    /// Параметры по умолчанию с наложенными параметрами оператора
    pub fn params(&self, overrides: &ElphaseParams) -> ElphaseParams {
        self.defaults.merged(overrides)
    }

    pub fn check(&self, item: &str, params: &ElphaseParams, section: &Section) -> Vec<CheckResult> {
        match section.group(self.group) {
            Some(group) => check_elphase(item, params, group),
            None => vec![CheckResult::item_not_found(item)],
        }
    }

    pub fn service_name(&self, item: &str) -> String {
        self.service_name.replace("%s", item)
    }
}
