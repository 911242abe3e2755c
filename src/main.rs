use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rnx_updu_checks::collector::SnapshotCollector;
use rnx_updu_checks::config::AppConfig;
use rnx_updu_checks::formatter::JsonFormatter;
use rnx_updu_checks::plugins::{self, PluginRunner};

fn main() -> Result<()> {
    // Логи в stderr, stdout остаётся под JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    plugins::validate_catalog()?;
    for section in plugins::SECTIONS.iter() {
        debug!(section = section.name, fetch = ?section.fetch_oids(), "объявленная выборка");
    }

    let config = AppConfig::from_env()?;
    config.debug_config();

    // Путь к снапшоту можно передать первым аргументом
    let snapshot_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.get_snapshot_path());
    let snapshot = SnapshotCollector::load(&snapshot_path)?;

    let result = PluginRunner::new(&config.profile).run(&snapshot);

    let json = if config.is_compact() {
        JsonFormatter::to_json_compact(&result)?
    } else {
        JsonFormatter::to_json_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
