//! Инвентарь UPDU: PDU, модуль управления (ICM) и модули розеток (POM).

use tracing::debug;

use crate::collector::RawTable;
use crate::decoder::naming::is_present;
use crate::decoder::{CUSTOM_NAME, DESCRIPTION, DecodeError, EntityMap, Row, RowDecoder, SYSTEM_NAME};
use crate::host::{InventoryRecord, columns, tree_path};
use crate::snmp::{ColumnSpec, ParsePolicy, RNX_UPDU_DETECT, SnmpSection, TableSchema};

pub const MANUFACTURER: &str = "Riedo Networks";
const DEFAULT_MODEL: &str = "RNX UPDU";
/// У всех POM по 8 розеток
const MODULE_OUTLETS: u32 = 8;

const SERIAL_NUMBER: &str = "serial_number";
const PART_NUMBER: &str = "part_number";
const LOT_NUMBER: &str = "lot_number";
const FIRMWARE: &str = "firmware";
const RATING: &str = "rating";
const COMPOSED_NAME: &str = "composed_name";
const OBJECT_PATH: &str = "object_path";

pub static INVENTORY_SECTION: SnmpSection = SnmpSection {
    name: "rnx_updu_inventory_section",
    detect: RNX_UPDU_DETECT,
    fetch: &[
        TableSchema {
            name: "pdu",
            base: ".1.3.6.1.4.1.55108.2.1.2.1",
            columns: &[
                ColumnSpec::text("2", SYSTEM_NAME),
                ColumnSpec::text("3", CUSTOM_NAME),
                ColumnSpec::text("4", DESCRIPTION),
                ColumnSpec::text("5", SERIAL_NUMBER),
                ColumnSpec::text("6", PART_NUMBER),
                ColumnSpec::text("7", LOT_NUMBER),
            ],
        },
        TableSchema {
            name: "icm",
            base: ".1.3.6.1.4.1.55108.2.6.2.1",
            columns: &[
                ColumnSpec::text("2", SYSTEM_NAME),
                ColumnSpec::text("5", SERIAL_NUMBER),
                ColumnSpec::text("6", PART_NUMBER),
                ColumnSpec::text("7", LOT_NUMBER),
                ColumnSpec::text("9", FIRMWARE),
            ],
        },
        TableSchema {
            name: "module",
            base: ".1.3.6.1.4.1.55108.2.8.2.1",
            columns: &[
                ColumnSpec::text("2", SYSTEM_NAME),
                ColumnSpec::text("5", SERIAL_NUMBER),
                ColumnSpec::text("6", PART_NUMBER),
                ColumnSpec::text("7", LOT_NUMBER),
                // мА
                ColumnSpec::integer("8", RATING, ParsePolicy::Fallback(0)),
                ColumnSpec::text("9", FIRMWARE),
                ColumnSpec::text("10", COMPOSED_NAME),
                ColumnSpec::text("11", OBJECT_PATH),
            ],
        },
    ],
};

const PDU_TABLE: usize = 0;
const ICM_TABLE: usize = 1;
const MODULE_TABLE: usize = 2;

/// Ревизия из последнего сегмента номера детали: "100-0141-3" -> 3.
/// Любой другой формат даёт 0.
pub fn parse_revision(part_number: &str) -> u32 {
    if !part_number.contains('-') {
        return 0;
    }
    part_number
        .rsplit('-')
        .next()
        .filter(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}

/// Фаза модуля из пути объекта "PDU/Inlet/WireL1/Module1" -> "L1"
pub fn module_phase(object_path: &str) -> String {
    object_path
        .split('/')
        .nth(2)
        .and_then(|segment| segment.strip_prefix("Wire"))
        .filter(|phase| phase.starts_with('L'))
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn text(row: &Row<'_>, field: &str) -> Result<String, DecodeError> {
    Ok(row.text(field)?.trim().to_string())
}

/// Модуль управления, привязанный к PDU с тем же номером строки
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcmRecord {
    pub system_name: String,
    pub serial_number: String,
    pub part_number: String,
    pub lot_number: String,
    pub firmware: String,
    pub revision: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PduRecord {
    pub system_name: String,
    pub custom_name: String,
    pub description: String,
    pub serial_number: String,
    pub part_number: String,
    pub lot_number: String,
    pub icm: Option<IcmRecord>,
}

impl PduRecord {
    /// "sys (custom)", если заданы оба, иначе то, что есть
    pub fn display_name(&self) -> String {
        match (is_present(&self.system_name), is_present(&self.custom_name)) {
            (true, true) => format!("{} ({})", self.system_name, self.custom_name),
            (_, true) => self.custom_name.clone(),
            (true, false) => self.system_name.clone(),
            (false, false) => DEFAULT_MODEL.to_string(),
        }
    }
}

/// Модуль розеток (Power Outlet Module)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    pub system_name: String,
    pub serial_number: String,
    pub part_number: String,
    pub lot_number: String,
    /// Номинальный ток, мА
    pub rating: u64,
    pub firmware: String,
    pub composed_name: String,
    pub object_path: String,
    pub phase: String,
    pub outlets: u32,
    pub revision: u32,
}

impl ModuleRecord {
    pub fn display_name(&self) -> String {
        format!("POM {}", self.system_name)
    }

    /// Номинальный ток в амперах: 16000 -> "16.0 A"
    pub fn rating_amps(&self) -> String {
        format!("{:?} A", self.rating as f64 / 1000.0)
    }
}

/// PDU по ключам `pdu_{n}` и модули по ключам `module_{n}`, n с единицы
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySection {
    pub pdus: EntityMap<PduRecord>,
    pub modules: EntityMap<ModuleRecord>,
}

/// Плагин инвентаря
pub struct InventoryPlugin;

impl InventoryPlugin {
    pub fn parse(tables: &[RawTable]) -> Result<InventorySection, DecodeError> {
        let decoder = RowDecoder::new(&INVENTORY_SECTION);
        decoder.check_shape(tables)?;

        let mut section = InventorySection::default();

        for (index, row) in decoder.rows(tables, PDU_TABLE)?.iter().enumerate() {
            let pdu = PduRecord {
                system_name: text(row, SYSTEM_NAME)?,
                custom_name: text(row, CUSTOM_NAME)?,
                description: text(row, DESCRIPTION)?,
                serial_number: text(row, SERIAL_NUMBER)?,
                part_number: text(row, PART_NUMBER)?,
                lot_number: text(row, LOT_NUMBER)?,
                icm: None,
            };
            section.pdus.insert(format!("pdu_{}", index + 1), pdu);
        }

        for (index, row) in decoder.rows(tables, ICM_TABLE)?.iter().enumerate() {
            let key = format!("pdu_{}", index + 1);
            let Some(pdu) = section.pdus.get_mut(&key) else {
                debug!(key = %key, "ICM без соответствующего PDU пропущен");
                continue;
            };
            let part_number = text(row, PART_NUMBER)?;
            pdu.icm = Some(IcmRecord {
                system_name: text(row, SYSTEM_NAME)?,
                serial_number: text(row, SERIAL_NUMBER)?,
                revision: parse_revision(&part_number),
                part_number,
                lot_number: text(row, LOT_NUMBER)?,
                firmware: text(row, FIRMWARE)?,
            });
        }

        for (index, row) in decoder.rows(tables, MODULE_TABLE)?.iter().enumerate() {
            let object_path = text(row, OBJECT_PATH)?;
            let part_number = text(row, PART_NUMBER)?;
            let module = ModuleRecord {
                system_name: text(row, SYSTEM_NAME)?,
                serial_number: text(row, SERIAL_NUMBER)?,
                revision: parse_revision(&part_number),
                part_number,
                lot_number: text(row, LOT_NUMBER)?,
                rating: row.unsigned(RATING)?,
                firmware: text(row, FIRMWARE)?,
                composed_name: text(row, COMPOSED_NAME)?,
                phase: module_phase(&object_path),
                object_path,
                outlets: MODULE_OUTLETS,
            };
            debug!(name = %module.system_name, phase = %module.phase, "модуль разобран");
            section.modules.insert(format!("module_{}", index + 1), module);
        }

        debug!(
            pdus = section.pdus.len(),
            modules = section.modules.len(),
            "инвентарь разобран"
        );
        Ok(section)
    }

    pub fn validate() -> anyhow::Result<()> {
        INVENTORY_SECTION.validate()
    }

    pub fn inventory(section: &InventorySection) -> Vec<InventoryRecord> {
        let mut records = Vec::new();

        for (key, pdu) in section.pdus.iter() {
            records.push(system_attributes(pdu));
            if let Some(icm) = &pdu.icm {
                if is_present(&icm.serial_number) || is_present(&icm.part_number) {
                    records.push(icm_row(key, pdu, icm));
                }
            }
        }

        for (key, module) in section.modules.iter() {
            records.push(module_row(key, module));
            if is_present(&module.firmware) {
                records.push(firmware_row(module));
            }
        }

        records
    }
}

fn first_present<'a>(candidates: &[&'a str], default: &'a str) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|value| is_present(value))
        .unwrap_or(default)
}

fn system_attributes(pdu: &PduRecord) -> InventoryRecord {
    let icm = pdu.icm.as_ref();
    let icm_serial = icm.map(|icm| icm.serial_number.as_str()).unwrap_or_default();
    let icm_part = icm.map(|icm| icm.part_number.as_str()).unwrap_or_default();
    let model = first_present(&[pdu.part_number.as_str()], DEFAULT_MODEL);

    InventoryRecord::Attributes {
        path: tree_path(&["hardware", "system"]),
        attributes: columns([
            ("manufacturer", MANUFACTURER.to_string()),
            ("product", model.to_string()),
            ("model", model.to_string()),
            ("serial", first_present(&[pdu.serial_number.as_str(), icm_serial], "").to_string()),
            ("name", pdu.display_name()),
            ("description", first_present(&[pdu.description.as_str()], DEFAULT_MODEL).to_string()),
            ("part_number", first_present(&[pdu.part_number.as_str(), icm_part], "").to_string()),
        ]),
    }
}

fn icm_row(key: &str, pdu: &PduRecord, icm: &IcmRecord) -> InventoryRecord {
    InventoryRecord::TableRow {
        path: tree_path(&["hardware", "modules"]),
        key_columns: columns([("type", "ICM")]),
        inventory_columns: columns([
            ("name", "Interface Controller Module".to_string()),
            ("device", first_present(&[pdu.system_name.as_str()], key).to_string()),
            ("serial_number", icm.serial_number.clone()),
            ("part_number", icm.part_number.clone()),
            ("lot_number", icm.lot_number.clone()),
            ("firmware", icm.firmware.clone()),
            ("revision", icm.revision.to_string()),
            ("module_id", key.to_string()),
            (
                "description",
                first_present(&[pdu.description.as_str()], "Network Interface and Control Module")
                    .to_string(),
            ),
        ]),
    }
}

fn module_row(key: &str, module: &ModuleRecord) -> InventoryRecord {
    InventoryRecord::TableRow {
        path: tree_path(&["hardware", "modules"]),
        key_columns: columns([("module_id", key)]),
        inventory_columns: columns([
            ("name", module.display_name()),
            ("type", "POM".to_string()),
            ("phase", module.phase.clone()),
            ("outlets", module.outlets.to_string()),
            ("serial_number", module.serial_number.clone()),
            ("part_number", module.part_number.clone()),
            ("lot_number", module.lot_number.clone()),
            ("rating", module.rating_amps()),
            ("firmware", module.firmware.clone()),
            ("revision", module.revision.to_string()),
            ("object_path", module.object_path.clone()),
            ("composed_name", module.composed_name.clone()),
            ("description", "Power Outlet Module".to_string()),
        ]),
    }
}

fn firmware_row(module: &ModuleRecord) -> InventoryRecord {
    InventoryRecord::TableRow {
        path: tree_path(&["software", "firmware"]),
        key_columns: columns([("name", format!("{} Firmware", module.display_name()))]),
        inventory_columns: columns([
            ("version", module.firmware.clone()),
            ("vendor", MANUFACTURER.to_string()),
            ("package_type", "Firmware".to_string()),
            ("path", module.object_path.clone()),
            ("summary", format!("Firmware for POM on phase {}", module.phase)),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn tables() -> Vec<RawTable> {
        vec![
            vec![row(&["PDU1", "Rack3", "Main PDU", "SN100", "100-0200-2", "LOT7"])],
            vec![
                row(&["ICM1", "SN200", "100-0141-3", "LOT8", " 2.4.1 "]),
                row(&["ICM2", "SN201", "100-0141-3", "LOT8", "2.4.1"]),
            ],
            vec![
                row(&["Module1", "SN300", "100-0715-2", "LOT9", "16000", "1.2.0", "PDU1 Module1", "PDU1/Inlet1/WireL1/Module1"]),
                row(&["Module2", "SN301", "NOFORMAT", "LOT9", "n/a", "", "PDU1 Module2", "PDU1/Inlet1/Branch1/Module2"]),
            ],
        ]
    }

    fn find<'a>(records: &'a [InventoryRecord], path: &[&str]) -> Vec<&'a InventoryRecord> {
        records
            .iter()
            .filter(|record| record.path() == tree_path(path).as_slice())
            .collect()
    }

    fn inventory_columns(record: &InventoryRecord) -> &BTreeMap<String, String> {
        match record {
            InventoryRecord::TableRow { inventory_columns, .. } => inventory_columns,
            InventoryRecord::Attributes { attributes, .. } => attributes,
        }
    }

    #[test]
    fn catalog_is_consistent() {
        InventoryPlugin::validate().unwrap();
    }

    #[test]
    fn revision_from_part_number() {
        assert_eq!(parse_revision("100-0141-3"), 3);
        assert_eq!(parse_revision("NOFORMAT"), 0);
        assert_eq!(parse_revision("100-0141-"), 0);
        assert_eq!(parse_revision("100-0141-B"), 0);
        assert_eq!(parse_revision(""), 0);
    }

    #[test]
    fn phase_from_object_path() {
        assert_eq!(module_phase("PDU1/Inlet1/WireL2/Module1"), "L2");
        assert_eq!(module_phase("PDU1/Inlet1/Branch1/Module2"), "Unknown");
        assert_eq!(module_phase("WireL1"), "Unknown");
    }

    #[test]
    fn icm_merges_into_matching_pdu_only() {
        let section = InventoryPlugin::parse(&tables()).unwrap();
        assert_eq!(section.pdus.len(), 1);

        let icm = section.pdus.get("pdu_1").unwrap().icm.as_ref().unwrap();
        assert_eq!(icm.firmware, "2.4.1");
        assert_eq!(icm.revision, 3);

        let module = section.modules.get("module_2").unwrap();
        assert_eq!(module.rating, 0);
        assert_eq!(module.revision, 0);
        assert_eq!(module.phase, "Unknown");
    }

    #[test]
    fn system_attributes_and_icm_row() {
        let section = InventoryPlugin::parse(&tables()).unwrap();
        let records = InventoryPlugin::inventory(&section);

        let system = find(&records, &["hardware", "system"]);
        assert_eq!(system.len(), 1);
        let attributes = inventory_columns(system[0]);
        assert_eq!(attributes["manufacturer"], "Riedo Networks");
        assert_eq!(attributes["model"], "100-0200-2");
        assert_eq!(attributes["name"], "PDU1 (Rack3)");
        assert_eq!(attributes["serial"], "SN100");
        assert_eq!(attributes["description"], "Main PDU");

        let modules = find(&records, &["hardware", "modules"]);
        assert_eq!(modules.len(), 3);
        let icm = inventory_columns(modules[0]);
        assert_eq!(icm["name"], "Interface Controller Module");
        assert_eq!(icm["device"], "PDU1");
        assert_eq!(icm["revision"], "3");
        assert_eq!(icm["module_id"], "pdu_1");
    }

    #[test]
    fn module_and_firmware_rows() {
        let section = InventoryPlugin::parse(&tables()).unwrap();
        let records = InventoryPlugin::inventory(&section);

        let modules = find(&records, &["hardware", "modules"]);
        let first = inventory_columns(modules[1]);
        assert_eq!(first["name"], "POM Module1");
        assert_eq!(first["phase"], "L1");
        assert_eq!(first["outlets"], "8");
        assert_eq!(first["rating"], "16.0 A");
        assert_eq!(first["revision"], "2");

        let firmware = find(&records, &["software", "firmware"]);
        assert_eq!(firmware.len(), 1);
        let InventoryRecord::TableRow { key_columns, inventory_columns, .. } = firmware[0] else {
            panic!("ожидалась строка таблицы");
        };
        assert_eq!(key_columns["name"], "POM Module1 Firmware");
        assert_eq!(inventory_columns["summary"], "Firmware for POM on phase L1");
        assert_eq!(inventory_columns["vendor"], "Riedo Networks");
    }

    #[test]
    fn empty_pdu_falls_back_to_defaults() {
        let tables = vec![vec![row(&["", "", "", "", "", ""])], vec![], vec![]];
        let section = InventoryPlugin::parse(&tables).unwrap();
        let records = InventoryPlugin::inventory(&section);

        assert_eq!(records.len(), 1);
        let attributes = inventory_columns(&records[0]);
        assert_eq!(attributes["name"], "RNX UPDU");
        assert_eq!(attributes["product"], "RNX UPDU");
        assert_eq!(attributes["description"], "RNX UPDU");
        assert_eq!(attributes["serial"], "");
    }

    #[test]
    fn fractional_rating() {
        let tables = vec![
            vec![],
            vec![],
            vec![row(&["Module1", "SN300", "100-0715-2", "LOT9", "16500", "", "", "PDU1/Inlet1/WireL3/Module1"])],
        ];
        let section = InventoryPlugin::parse(&tables).unwrap();
        assert_eq!(section.modules.get("module_1").unwrap().rating_amps(), "16.5 A");

        let records = InventoryPlugin::inventory(&section);
        let modules = find(&records, &["hardware", "modules"]);
        assert_eq!(modules.len(), 1);
        assert_eq!(inventory_columns(modules[0])["rating"], "16.5 A");
        assert_eq!(inventory_columns(modules[0])["phase"], "L3");
    }

    #[test]
    fn icm_without_serial_and_part_is_not_reported() {
        let tables = vec![
            vec![row(&["PDU1", "", "Main PDU", "SN100", "100-0200-2", "LOT7"])],
            vec![row(&["ICM1", "", "", "LOT8", "2.4.1"])],
            vec![],
        ];
        let section = InventoryPlugin::parse(&tables).unwrap();
        assert!(section.pdus.get("pdu_1").unwrap().icm.is_some());

        let records = InventoryPlugin::inventory(&section);
        assert!(find(&records, &["hardware", "modules"]).is_empty());
        assert_eq!(find(&records, &["hardware", "system"]).len(), 1);
    }

    #[test]
    fn icm_description_defaults_without_pdu_description() {
        let tables = vec![
            vec![row(&["PDU1", "", "", "SN100", "100-0200-2", "LOT7"])],
            vec![row(&["ICM1", "SN200", "", "LOT8", "2.4.1"])],
            vec![],
        ];
        let section = InventoryPlugin::parse(&tables).unwrap();
        let records = InventoryPlugin::inventory(&section);

        let modules = find(&records, &["hardware", "modules"]);
        assert_eq!(modules.len(), 1);
        let icm = inventory_columns(modules[0]);
        assert_eq!(icm["description"], "Network Interface and Control Module");
        assert_eq!(icm["revision"], "0");
    }
}
