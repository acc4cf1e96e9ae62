use anyhow::{Context, Result};
use doughdetective::ledger::LedgerSettings;
use doughdetective::statement::StatementFormat;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigCache {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_expire_after_secs")]
    pub expire_after_secs: u64,
}

impl Default for ConfigCache {
    fn default() -> Self {
        ConfigCache {
            enabled: true,
            dir: default_cache_dir(),
            expire_after_secs: default_expire_after_secs(),
        }
    }
}

impl ConfigCache {
    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.expire_after_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".doughdetective-cache")
}

fn default_expire_after_secs() -> u64 {
    doughdetective::ledger::DEFAULT_EXPIRE_AFTER.as_secs()
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("csv_files")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFormat {
    /// Name of the matching asset account in the ledger, if it differs from the format's key.
    pub ledger_account: Option<String>,
    pub statement: StatementFormat,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub cache: ConfigCache,
    /// Directory holding the `{YYYYMM}_{account}.csv` statements.
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    #[serde(default)]
    pub formats: BTreeMap<String, ConfigFormat>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<(PathBuf, Self)> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok((base_dir, config))
    }

    pub fn find_and_load() -> Result<Option<(PathBuf, Self)>> {
        let config_locations = [
            Path::new("doughdetective.toml"),
            Path::new(".doughdetective.toml"),
        ];

        for location in &config_locations {
            if location.exists() {
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }

    pub fn format(&self, account: &str) -> Result<&ConfigFormat> {
        self.formats.get(account).with_context(|| {
            let known: Vec<_> = self.formats.keys().map(String::as_str).collect();
            format!(
                "No statement format configured for account '{account}' (known: {})",
                known.join(", ")
            )
        })
    }
}
