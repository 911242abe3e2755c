//! Оценка показаний по порогам для электрических фаз, температуры и
//! влажности. Плагины только находят запись и передают её сюда вместе с
//! параметрами.

use serde::{Deserialize, Serialize};

use super::{CheckResult, State};
use crate::decoder::{EntityMap, Metric, Reading};

/// Пороги (warn, crit)
pub type Levels = (f64, f64);

/// Параметры проверки электрической фазы
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElphaseParams {
    /// Нижние пороги напряжения, В
    pub voltage: Option<Levels>,
    /// Верхние пороги тока, А
    pub current: Option<Levels>,
    /// Верхние пороги активной мощности, Вт
    pub power: Option<Levels>,
    /// Верхние пороги полной мощности, ВА
    pub appower: Option<Levels>,
}

impl ElphaseParams {
    /// Накладывает параметры оператора поверх значений по умолчанию
    pub fn merged(&self, overrides: &ElphaseParams) -> ElphaseParams {
        ElphaseParams {
            voltage: overrides.voltage.or(self.voltage),
            current: overrides.current.or(self.current),
            power: overrides.power.or(self.power),
            appower: overrides.appower.or(self.appower),
        }
    }
}

/// Верхние и нижние пороги для температуры и влажности
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsParams {
    pub levels: Option<Levels>,
    pub levels_lower: Option<Levels>,
}

impl LevelsParams {
    pub fn merged(&self, overrides: &LevelsParams) -> LevelsParams {
        LevelsParams {
            levels: overrides.levels.or(self.levels),
            levels_lower: overrides.levels_lower.or(self.levels_lower),
        }
    }
}

/// Сравнивает значение с верхними и нижними порогами.
///
/// `unit` дописывается к числу как есть, поэтому для вольт передаётся " V",
/// а для процентов "%".
pub fn check_levels(
    value: f64,
    upper: Option<Levels>,
    lower: Option<Levels>,
    metric_name: &str,
    label: &str,
    unit: &str,
) -> CheckResult {
    let mut state = State::Ok;
    let mut note = String::new();

    if let Some((warn, crit)) = upper {
        if value >= crit {
            state = State::Crit;
        } else if value >= warn {
            state = State::Warn;
        }
        if state != State::Ok {
            note = format!(" (warn/crit at {warn:.1}{unit}/{crit:.1}{unit})");
        }
    }

    if state == State::Ok {
        if let Some((warn, crit)) = lower {
            if value < crit {
                state = State::Crit;
            } else if value < warn {
                state = State::Warn;
            }
            if state != State::Ok {
                note = format!(" (warn/crit below {warn:.1}{unit}/{crit:.1}{unit})");
            }
        }
    }

    CheckResult::new(state, format!("{label}: {value:.1}{unit}{note}")).with_metric(
        metric_name,
        value,
        upper,
    )
}

/// Порядок и подписи метрик в проверке фазы
const ELPHASE_METRICS: [(Metric, &str, &str); 5] = [
    (Metric::Voltage, "Voltage", " V"),
    (Metric::Current, "Current", " A"),
    (Metric::Power, "Power", " W"),
    (Metric::ApparentPower, "Apparent Power", " VA"),
    (Metric::Energy, "Energy", " Wh"),
];

/// Проверка электрической фазы: имя, состояние устройства и все метрики
/// записи. Напряжение сравнивается с нижними порогами, остальное с верхними.
pub fn check_elphase(
    item: &str,
    params: &ElphaseParams,
    group: &EntityMap<Reading>,
) -> Vec<CheckResult> {
    let Some(reading) = group.get(item) else {
        return vec![CheckResult::item_not_found(item)];
    };

    let mut results = vec![
        CheckResult::new(State::Ok, reading.name.clone()),
        CheckResult::new(
            reading.quality.state(),
            format!("Device status: {}", reading.quality.label()),
        ),
    ];

    for (metric, label, unit) in ELPHASE_METRICS {
        let Some(value) = reading.metric(metric) else {
            continue;
        };
        let (upper, lower) = match metric {
            Metric::Voltage => (None, params.voltage),
            Metric::Current => (params.current, None),
            Metric::Power => (params.power, None),
            Metric::ApparentPower => (params.appower, None),
            _ => (None, None),
        };
        results.push(check_levels(value, upper, lower, metric.key(), label, unit));
    }

    results
}

/// Температура по порогам, затем состояние датчика на устройстве
pub fn check_temperature(
    reading: f64,
    params: &LevelsParams,
    dev_status: State,
    dev_status_name: &str,
) -> Vec<CheckResult> {
    vec![
        check_levels(
            reading,
            params.levels,
            params.levels_lower,
            Metric::Temperature.key(),
            "Temperature",
            " °C",
        ),
        CheckResult::new(dev_status, format!("State on device: {}", dev_status_name)),
    ]
}

/// Влажность по порогам
pub fn check_humidity(reading: f64, params: &LevelsParams) -> CheckResult {
    check_levels(
        reading,
        params.levels,
        params.levels_lower,
        Metric::Humidity.key(),
        "Humidity",
        "%",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DataQuality, EntityKind};
    use std::collections::BTreeMap;

    fn inlet(quality: DataQuality) -> Reading {
        Reading {
            name: "Inlet1 (Rack3)".to_string(),
            kind: EntityKind::Inlet,
            title: String::new(),
            quality,
            metrics: BTreeMap::from([
                (Metric::Voltage, 230.1),
                (Metric::Current, 4.2),
                (Metric::Power, 950.0),
                (Metric::ApparentPower, 990.0),
                (Metric::Energy, 123456.0),
            ]),
        }
    }

    fn group(quality: DataQuality) -> EntityMap<Reading> {
        let mut group = EntityMap::default();
        group.insert("Inlet1".to_string(), inlet(quality));
        group
    }

    #[test]
    fn upper_levels() {
        let result = check_levels(5.0, Some((9.0, 10.0)), None, "current", "Current", " A");
        assert_eq!(result.state, State::Ok);
        assert_eq!(result.summary, "Current: 5.0 A");

        let result = check_levels(9.0, Some((9.0, 10.0)), None, "current", "Current", " A");
        assert_eq!(result.state, State::Warn);
        assert_eq!(result.summary, "Current: 9.0 A (warn/crit at 9.0 A/10.0 A)");

        let result = check_levels(12.0, Some((9.0, 10.0)), None, "current", "Current", " A");
        assert_eq!(result.state, State::Crit);
        assert_eq!(result.metric.unwrap().levels, Some((9.0, 10.0)));
    }

    #[test]
    fn lower_levels() {
        let result = check_levels(198.0, None, Some((200.0, 195.0)), "voltage", "Voltage", " V");
        assert_eq!(result.state, State::Warn);
        assert_eq!(result.summary, "Voltage: 198.0 V (warn/crit below 200.0 V/195.0 V)");

        let result = check_levels(190.0, None, Some((200.0, 195.0)), "voltage", "Voltage", " V");
        assert_eq!(result.state, State::Crit);

        let result = check_levels(200.0, None, Some((200.0, 195.0)), "voltage", "Voltage", " V");
        assert_eq!(result.state, State::Ok);
    }

    #[test]
    fn elphase_reports_every_metric_in_order() {
        let params = ElphaseParams {
            voltage: Some((200.0, 195.0)),
            current: Some((9.0, 10.0)),
            power: Some((2000.0, 3000.0)),
            appower: Some((2200.0, 3300.0)),
        };
        let results = check_elphase("Inlet1", &params, &group(DataQuality::Good));

        let summaries: Vec<&str> = results.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "Inlet1 (Rack3)",
                "Device status: OK",
                "Voltage: 230.1 V",
                "Current: 4.2 A",
                "Power: 950.0 W",
                "Apparent Power: 990.0 VA",
                "Energy: 123456.0 Wh",
            ]
        );
        assert!(results.iter().all(|r| r.state == State::Ok));
    }

    #[test]
    fn elphase_surfaces_expired_quality() {
        let results = check_elphase("Inlet1", &ElphaseParams::default(), &group(DataQuality::Expired));
        assert_eq!(results[1].state, State::Warn);
        assert_eq!(results[1].summary, "Device status: Expired");
        assert_eq!(State::worst_of(&results), State::Warn);
    }

    #[test]
    fn elphase_missing_item_is_unknown() {
        let results = check_elphase("Inlet9", &ElphaseParams::default(), &group(DataQuality::Good));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, State::Unknown);
        assert!(results[0].summary.contains("not found"));
    }

    #[test]
    fn temperature_appends_device_state() {
        let params = LevelsParams {
            levels: Some((42.0, 50.0)),
            levels_lower: Some((15.0, 5.0)),
        };
        let results = check_temperature(42.3, &params, State::Warn, "Expired");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].state, State::Warn);
        assert_eq!(results[0].summary, "Temperature: 42.3 °C (warn/crit at 42.0 °C/50.0 °C)");
        assert_eq!(results[1].state, State::Warn);
        assert_eq!(results[1].summary, "State on device: Expired");
    }

    #[test]
    fn humidity_lower_bound() {
        let params = LevelsParams {
            levels: Some((75.0, 80.0)),
            levels_lower: Some((7.0, 5.0)),
        };
        assert_eq!(check_humidity(45.5, &params).state, State::Ok);
        assert_eq!(check_humidity(4.0, &params).state, State::Crit);
        assert_eq!(check_humidity(45.5, &params).summary, "Humidity: 45.5%");
    }

    #[test]
    fn merged_params_prefer_overrides() {
        let defaults = ElphaseParams {
            voltage: Some((200.0, 195.0)),
            current: Some((9.0, 10.0)),
            ..Default::default()
        };
        let overrides = ElphaseParams {
            current: Some((12.0, 14.0)),
            ..Default::default()
        };
        let merged = defaults.merged(&overrides);
        assert_eq!(merged.voltage, Some((200.0, 195.0)));
        assert_eq!(merged.current, Some((12.0, 14.0)));
        assert_eq!(merged.power, None);
    }
}
