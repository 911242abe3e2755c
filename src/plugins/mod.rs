//! Плагины RNX UPDU и прогон всех плагинов по одному снапшоту.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collector::{RawTable, Snapshot};
use crate::config::Profile;
use crate::decoder::{DecodeError, Section};
use crate::host::{CheckResult, InventoryRecord, Service, State};
use crate::snmp::{DeviceDetector, DeviceInfo, SYS_DESCR, SnmpSection};

pub mod interfaces;
pub mod inventory;
pub mod power;
pub mod sensors;

use interfaces::{INTERFACE_SECTION, InterfacePlugin};
use inventory::{INVENTORY_SECTION, InventoryPlugin};
use power::{ELPHASE_PLUGINS, POWER_SECTION, PowerPlugin};
use sensors::{
    HUMIDITY_DEFAULTS, HUMIDITY_PLUGIN, SENSOR_SECTION, SensorPlugin, TEMPERATURE_DEFAULTS,
    TEMPERATURE_PLUGIN,
};

/// Результат проверки одного сервиса
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResult {
    pub plugin: &'static str,
    pub service: String,
    pub item: String,
    /// Худшее состояние среди результатов
    pub state: State,
    pub results: Vec<CheckResult>,
}

impl ServiceResult {
    fn new(plugin: &'static str, service: String, discovered: Service, results: Vec<CheckResult>) -> Self {
        Self {
            plugin,
            service,
            item: discovered.item,
            state: State::worst_of(&results),
            results,
        }
    }
}

/// Секция, которую не удалось разобрать в этом цикле
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFailure {
    pub section: &'static str,
    pub error: String,
}

/// Всё, что плагины выдали по одному снапшоту
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitoringResult {
    pub device: DeviceInfo,
    pub services: Vec<ServiceResult>,
    pub inventory: Vec<InventoryRecord>,
    pub failures: Vec<SectionFailure>,
}

impl MonitoringResult {
    fn fail(&mut self, section: &'static str, error: DecodeError) {
        warn!(section, error = %error, "секция не разобрана");
        self.failures.push(SectionFailure {
            section,
            error: error.to_string(),
        });
    }
}

/// Все секции, которые объявляют плагины
pub static SECTIONS: [&SnmpSection; 4] = [
    &POWER_SECTION,
    &SENSOR_SECTION,
    &INTERFACE_SECTION,
    &INVENTORY_SECTION,
];

/// Проверка каталогов при старте: OID, поля групп, дубликаты колонок
pub fn validate_catalog() -> Result<()> {
    PowerPlugin::validate().context("Каталог питания")?;
    SensorPlugin::validate().context("Каталог датчиков")?;
    InterfacePlugin::validate().context("Каталог интерфейсов")?;
    InventoryPlugin::validate().context("Каталог инвентаря")?;
    Ok(())
}

/// Прогон обнаружения, проверок и инвентаря по снапшоту
pub struct PluginRunner<'a> {
    profile: &'a Profile,
}

impl<'a> PluginRunner<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    /// Каждая секция разбирается независимо: ошибка одной попадает в
    /// `failures`, остальные продолжают работать
    pub fn run(&self, snapshot: &Snapshot) -> MonitoringResult {
        let sys_descr = snapshot.scalar(SYS_DESCR).unwrap_or_default();
        let mut result = MonitoringResult {
            device: DeviceDetector::detect_device_type(sys_descr),
            ..Default::default()
        };

        if let Some(tables) = section_tables(snapshot, &POWER_SECTION) {
            match PowerPlugin::parse(tables) {
                Ok(section) => self.run_power(&section, &mut result),
                Err(error) => result.fail(POWER_SECTION.name, error),
            }
        }

        if let Some(tables) = section_tables(snapshot, &SENSOR_SECTION) {
            match SensorPlugin::parse(tables) {
                Ok(section) => self.run_sensors(&section, &mut result),
                Err(error) => result.fail(SENSOR_SECTION.name, error),
            }
        }

        if let Some(tables) = section_tables(snapshot, &INTERFACE_SECTION) {
            match InterfacePlugin::parse(tables) {
                Ok(section) => self.run_interfaces(&section, &mut result),
                Err(error) => result.fail(INTERFACE_SECTION.name, error),
            }
        }

        if let Some(tables) = section_tables(snapshot, &INVENTORY_SECTION) {
            match InventoryPlugin::parse(tables) {
                Ok(section) => result.inventory.extend(InventoryPlugin::inventory(&section)),
                Err(error) => result.fail(INVENTORY_SECTION.name, error),
            }
        }

        info!(
            services = result.services.len(),
            inventory = result.inventory.len(),
            failures = result.failures.len(),
            "прогон завершён"
        );
        result
    }

    fn run_power(&self, section: &Section, result: &mut MonitoringResult) {
        for plugin in &ELPHASE_PLUGINS {
            let params = plugin.params(&self.profile.elphase(plugin.name));
            debug!(plugin = plugin.name, ruleset = plugin.ruleset, ?params, "пороги фазы");
            for service in plugin.discover(section) {
                let results = plugin.check(&service.item, &params, section);
                result.services.push(ServiceResult::new(
                    plugin.name,
                    plugin.service_name(&service.item),
                    service,
                    results,
                ));
            }
        }
    }

    fn run_sensors(&self, section: &Section, result: &mut MonitoringResult) {
        let params = TEMPERATURE_DEFAULTS.merged(&self.profile.temperature);
        for service in SensorPlugin::discover_temperature(section) {
            let results = SensorPlugin::check_temperature(&service.item, &params, section);
            result.services.push(ServiceResult::new(
                TEMPERATURE_PLUGIN,
                SensorPlugin::temperature_service_name(&service.item),
                service,
                results,
            ));
        }

        let params = HUMIDITY_DEFAULTS.merged(&self.profile.humidity);
        for service in SensorPlugin::discover_humidity(section) {
            let results = SensorPlugin::check_humidity(&service.item, &params, section);
            result.services.push(ServiceResult::new(
                HUMIDITY_PLUGIN,
                SensorPlugin::humidity_service_name(&service.item),
                service,
                results,
            ));
        }
    }

    fn run_interfaces(&self, section: &interfaces::InterfaceSection, result: &mut MonitoringResult) {
        for service in InterfacePlugin::discover(section) {
            let results = InterfacePlugin::check(&service.item, &self.profile.interfaces, section);
            result.services.push(ServiceResult::new(
                InterfacePlugin::NAME,
                InterfacePlugin::service_name(&service.item),
                service,
                results,
            ));
        }
        result.inventory.extend(InterfacePlugin::inventory(section));
    }
}

/// Таблицы секции, если устройство подходит и коллектор их прислал
fn section_tables<'s>(snapshot: &'s Snapshot, section: &SnmpSection) -> Option<&'s [RawTable]> {
    if !section.detect.matches(snapshot) {
        debug!(section = section.name, "устройство не подходит под секцию");
        return None;
    }

    let tables = snapshot.tables(section.name);
    if tables.is_none() {
        debug!(section = section.name, "секции нет в снапшоте");
    }
    tables
}
