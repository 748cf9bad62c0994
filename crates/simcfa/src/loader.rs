//! Scenario file loading
//!
//! The format follows the file extension: `.json` is read with `serde_json`,
//! `.yaml` and `.yml` with `serde_saphyr`.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use simcfa_core::SimulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
            _ => bail!(
                "cannot tell the format of {}: expected a .json, .yaml or .yml file",
                path.display()
            ),
        }
    }
}

pub fn parse_config(text: &str, format: ConfigFormat) -> Result<SimulationConfig> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(text).wrap_err("invalid JSON scenario")?,
        ConfigFormat::Yaml => {
            serde_saphyr::from_str(text).map_err(|e| eyre!("invalid YAML scenario: {e}"))?
        }
    };
    Ok(config)
}

pub fn render_config(config: &SimulationConfig, format: ConfigFormat) -> Result<String> {
    let text = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_saphyr::to_string(config)
            .map_err(|e| eyre!("failed to serialize scenario as YAML: {e}"))?,
    };
    Ok(text)
}

/// Read and parse a scenario file.
pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let format = ConfigFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read scenario {}", path.display()))?;
    let config = parse_config(&text, format)
        .wrap_err_with(|| format!("failed to load scenario {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        n_days = config.simulation_parameters.n_days,
        strategies = config.strategies.len(),
        "scenario loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcfa_core::config::{BondSchedule, StrategyConfig};
    use tempfile::tempdir;

    const YAML: &str = "\
simulation_parameters:
  n_days: 365
  start_date: 2025-01-01
initial_cash: 100000
strategies:
  - type: monthly_cash_move
    amount: -5000
  - type: bond_purchase
    quantity: 2
    bond:
      preset: one_year
    schedule:
      kind: on_date
      date: 2025-02-01
  - type: ignore_debt
";

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert!(ConfigFormat::from_path(Path::new("a.toml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("scenario")).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let config = parse_config(YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.simulation_parameters.n_days, 365);
        assert_eq!(config.initial_cash, 100_000);
        assert_eq!(config.strategies.len(), 3);
        assert!(matches!(
            config.strategies[1],
            StrategyConfig::BondPurchase {
                schedule: BondSchedule::OnDate { .. },
                ..
            }
        ));
        assert_eq!(config.strategies[2], StrategyConfig::IgnoreDebt);
    }

    #[test]
    fn test_json_and_yaml_render_the_same_scenario() {
        let example = SimulationConfig::example();
        for format in [ConfigFormat::Json, ConfigFormat::Yaml] {
            let text = render_config(&example, format).unwrap();
            assert_eq!(parse_config(&text, format).unwrap(), example);
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, YAML).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.strategies.len(), 3);
    }

    #[test]
    fn test_load_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"simulation_parameters\": 3}").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
        assert!(load_config(&dir.path().join("missing.json")).is_err());
    }
}
