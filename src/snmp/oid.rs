use anyhow::{Context, Result};
use snmp2::Oid;

/// sysDescr.0, по нему определяется семейство устройств
pub const SYS_DESCR: &str = ".1.3.6.1.2.1.1.1.0";

pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("Невалидный OID: {}", s))?;
    if parts.is_empty() {
        anyhow::bail!("Пустой OID: '{}'", s);
    }

    Oid::from(&parts).map_err(|e| anyhow::anyhow!("Не удалось создать Oid из '{}': {:?}", s, e))
}

/// Приводит OID к виду без ведущей точки, чтобы ".1.3.6" и "1.3.6" совпадали
pub fn normalize_oid(s: &str) -> &str {
    s.trim().trim_start_matches('.')
}

/// Склеивает базовый OID таблицы и номер колонки: ".1.3.6.1.2.1.2.2.1" + "7"
pub fn column_oid(base: &str, column: &str) -> String {
    format!(
        "{}.{}",
        base.trim().trim_end_matches('.'),
        column.trim().trim_start_matches('.')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_oid_with_leading_dot() {
        let oid = parse_oid(".1.3.6.1.4.1.55108.2.1.2.1").unwrap();
        let plain = parse_oid("1.3.6.1.4.1.55108.2.1.2.1").unwrap();
        assert_eq!(oid, plain);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_oid("1.3.six.1").is_err());
        assert!(parse_oid("").is_err());
        assert!(parse_oid("...").is_err());
    }

    #[test]
    fn builds_column_oid() {
        assert_eq!(column_oid(".1.3.6.1.2.1.2.2.1", "7"), ".1.3.6.1.2.1.2.2.1.7");
        assert_eq!(column_oid("1.3.6.1.", ".2"), "1.3.6.1.2");
    }

    #[test]
    fn normalizes_leading_dot() {
        assert_eq!(normalize_oid(".1.3.6.1.2.1.1.1.0"), "1.3.6.1.2.1.1.1.0");
        assert_eq!(normalize_oid("1.3.6.1.2.1.1.1.0"), "1.3.6.1.2.1.1.1.0");
    }
}
