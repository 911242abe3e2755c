use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub mod types;

pub use types::{RawRow, RawTable, Snapshot};

/// Загрузчик снапшотов, которые пишет внешний SNMP коллектор.
///
/// Сам опрос устройства здесь не выполняется: коллектор уже выровнял
/// строки по объявленным колонкам, мы только читаем результат.
pub struct SnapshotCollector;

impl SnapshotCollector {
    /// Читает снапшот из YAML или JSON файла
    pub fn load(path: impl AsRef<Path>) -> Result<Snapshot> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Не удалось прочитать снапшот: {}", path.display()))?;

        let snapshot = Self::parse(&content)
            .context(format!("Не удалось разобрать снапшот: {}", path.display()))?;

        debug!(
            path = %path.display(),
            scalars = snapshot.scalars.len(),
            sections = snapshot.sections.len(),
            rows = snapshot.total_rows(),
            "снапшот загружен"
        );

        Ok(snapshot)
    }

    /// Разбирает снапшот из строки (JSON тоже валидный YAML)
    pub fn parse(content: &str) -> Result<Snapshot> {
        let snapshot: Snapshot = serde_yml::from_str(content).context("Не удалось распарсить YAML")?;

        if snapshot.scalars.is_empty() && snapshot.sections.is_empty() {
            anyhow::bail!("Снапшот пустой");
        }

        Ok(snapshot)
    }
}
