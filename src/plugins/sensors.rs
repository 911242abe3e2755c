//! Внешние датчики температуры и влажности.

use crate::collector::RawTable;
use crate::decoder::{
    CUSTOM_NAME, DESCRIPTION, DecodeError, EntityKind, GroupSpec, Metric, MetricField, Naming,
    PORT, RecordSpec, RowDecoder, SYSTEM_NAME, Section,
};
use crate::host::levels::{check_humidity, check_temperature};
use crate::host::{CheckResult, LevelsParams, Service};
use crate::snmp::{ColumnSpec, RNX_UPDU_DETECT, SnmpSection, TableSchema};

pub const TEMPERATURE: &str = "temperature";
pub const HUMIDITY: &str = "humidity";

pub const TEMPERATURE_PLUGIN: &str = "rnx_updu_temperature";
pub const HUMIDITY_PLUGIN: &str = "rnx_updu_humidity";

pub static SENSOR_SECTION: SnmpSection = SnmpSection {
    name: "rnx_updu_section_sensor",
    detect: RNX_UPDU_DETECT,
    fetch: &[TableSchema {
        name: "sensor",
        base: ".1.3.6.1.4.1.55108.2.23.2.1",
        columns: &[
            ColumnSpec::text("2", SYSTEM_NAME),
            ColumnSpec::text("3", CUSTOM_NAME),
            ColumnSpec::text("4", DESCRIPTION),
            ColumnSpec::text("79", PORT),
            // десятые доли градуса
            ColumnSpec::metering("70", "temperature", 10.0),
            ColumnSpec::quality("71", "temperature_quality"),
            // десятые доли процента
            ColumnSpec::metering("72", "humidity", 10.0),
            ColumnSpec::quality("73", "humidity_quality"),
        ],
    }],
};

pub const SENSOR_GROUPS: &[GroupSpec] = &[
    GroupSpec {
        name: TEMPERATURE,
        sources: &[(0, EntityKind::ExternalSensor)],
        record: RecordSpec {
            quality: "temperature_quality",
            naming: Naming::OnPort("Temperature"),
            metrics: &[MetricField {
                field: "temperature",
                metric: Metric::Temperature,
            }],
        },
    },
    GroupSpec {
        name: HUMIDITY,
        sources: &[(0, EntityKind::ExternalSensor)],
        record: RecordSpec {
            quality: "humidity_quality",
            naming: Naming::OnPort("Humidity"),
            metrics: &[MetricField {
                field: "humidity",
                metric: Metric::Humidity,
            }],
        },
    },
];

pub const TEMPERATURE_DEFAULTS: LevelsParams = LevelsParams {
    levels: Some((42.0, 50.0)),
    levels_lower: Some((15.0, 5.0)),
};

pub const HUMIDITY_DEFAULTS: LevelsParams = LevelsParams {
    levels: Some((75.0, 80.0)),
    levels_lower: Some((7.0, 5.0)),
};

/// Плагин датчиков
pub struct SensorPlugin;

impl SensorPlugin {
    pub fn parse(tables: &[RawTable]) -> Result<Section, DecodeError> {
        RowDecoder::new(&SENSOR_SECTION).decode(tables, SENSOR_GROUPS)
    }

    pub fn validate() -> anyhow::Result<()> {
        RowDecoder::new(&SENSOR_SECTION).validate(SENSOR_GROUPS)
    }

    pub fn discover_temperature(section: &Section) -> Vec<Service> {
        Self::discover(section, TEMPERATURE)
    }

    pub fn discover_humidity(section: &Section) -> Vec<Service> {
        Self::discover(section, HUMIDITY)
    }

    pub fn temperature_service_name(item: &str) -> String {
        format!("{} Temperature", item)
    }

    pub fn humidity_service_name(item: &str) -> String {
        format!("{} Humidity", item)
    }

    fn discover(section: &Section, group: &str) -> Vec<Service> {
        section
            .group(group)
            .map(|group| group.keys().map(Service::new).collect())
            .unwrap_or_default()
    }

    /// Температура по порогам и состояние датчика на устройстве
    pub fn check_temperature(item: &str, params: &LevelsParams, section: &Section) -> Vec<CheckResult> {
        let Some(reading) = section.group(TEMPERATURE).and_then(|group| group.get(item)) else {
            return vec![CheckResult::item_not_found(item)];
        };
        let Some(value) = reading.metric(Metric::Temperature) else {
            return vec![CheckResult::item_not_found(item)];
        };

        check_temperature(value, params, reading.state(), reading.quality.label())
    }

    /// Влажность по порогам, затем отдельным результатом качество данных
    pub fn check_humidity(item: &str, params: &LevelsParams, section: &Section) -> Vec<CheckResult> {
        let Some(reading) = section.group(HUMIDITY).and_then(|group| group.get(item)) else {
            return vec![CheckResult::item_not_found(item)];
        };
        let Some(value) = reading.metric(Metric::Humidity) else {
            return vec![CheckResult::item_not_found(item)];
        };

        vec![
            check_humidity(value, params),
            CheckResult::new(reading.state(), reading.quality.label()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::State;

    fn sensor(cells: [&str; 8]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn tables() -> Vec<RawTable> {
        vec![vec![
            sensor(["Sensor1", "Cold aisle", "", "E1", "423", "0", "455", "1"]),
            sensor(["Sensor2", "", "Door", "E2", "215", "1", "0", "2"]),
            sensor(["Sensor3", "", "", "E3", "0", "2", "n/a", "2"]),
        ]]
    }

    #[test]
    fn catalog_is_consistent() {
        SensorPlugin::validate().unwrap();
    }

    #[test]
    fn splits_temperature_and_humidity() {
        let section = SensorPlugin::parse(&tables()).unwrap();

        let temperature = section.group(TEMPERATURE).unwrap();
        assert_eq!(temperature.keys().collect::<Vec<_>>(), vec!["Sensor1", "Sensor2"]);
        let first = temperature.get("Sensor1").unwrap();
        assert_eq!(first.name, "Sensor1 Temperature on E1 (Cold aisle)");
        assert_eq!(first.metric(Metric::Temperature), Some(42.3));
        assert_eq!(
            temperature.get("Sensor2").unwrap().name,
            "Sensor2 Temperature on E2 [Door]"
        );

        let humidity = section.group(HUMIDITY).unwrap();
        assert_eq!(humidity.keys().collect::<Vec<_>>(), vec!["Sensor1"]);
        assert_eq!(humidity.get("Sensor1").unwrap().metric(Metric::Humidity), Some(45.5));
        assert_eq!(humidity.get("Sensor1").unwrap().state(), State::Warn);
    }

    #[test]
    fn temperature_check_reports_threshold_and_device_state() {
        let section = SensorPlugin::parse(&tables()).unwrap();
        let results = SensorPlugin::check_temperature("Sensor1", &TEMPERATURE_DEFAULTS, &section);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].state, State::Warn);
        assert_eq!(results[0].summary, "Temperature: 42.3 °C (warn/crit at 42.0 °C/50.0 °C)");
        assert_eq!(results[1].state, State::Ok);
        assert_eq!(results[1].summary, "State on device: OK");

        let results = SensorPlugin::check_temperature("Sensor2", &TEMPERATURE_DEFAULTS, &section);
        assert_eq!(results[0].state, State::Ok);
        assert_eq!(results[1].state, State::Warn);
        assert_eq!(results[1].summary, "State on device: Expired");
    }

    #[test]
    fn humidity_check_appends_quality() {
        let section = SensorPlugin::parse(&tables()).unwrap();
        let results = SensorPlugin::check_humidity("Sensor1", &HUMIDITY_DEFAULTS, &section);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].state, State::Ok);
        assert_eq!(results[0].summary, "Humidity: 45.5%");
        assert_eq!(results[1].state, State::Warn);
        assert_eq!(results[1].summary, "Expired");
    }

    #[test]
    fn missing_sensor_is_unknown() {
        let section = SensorPlugin::parse(&tables()).unwrap();
        let results = SensorPlugin::check_humidity("Sensor2", &HUMIDITY_DEFAULTS, &section);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, State::Unknown);
        assert!(results[0].summary.contains("not found"));

        assert!(SensorPlugin::discover_temperature(&Section::default()).is_empty());
        assert_eq!(SensorPlugin::discover_humidity(&section).len(), 1);
        assert_eq!(SensorPlugin::humidity_service_name("Sensor1"), "Sensor1 Humidity");
    }
}
