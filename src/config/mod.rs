use std::{
    collections::BTreeMap,
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::validation::{DEFAULT_DESCRIPTION_LIMIT, DEFAULT_MAX_AMOUNT};
use crate::errors::{LedgerError, Result};
use crate::storage::ConnectionConfig;
use crate::utils::paths;

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
/// Environment variable overriding the database location.
pub const DB_ENV: &str = "FINTRACK_DB";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_file: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
    pub currency_label: String,
    pub history_page_size: u32,
    pub description_max_len: usize,
    pub max_amount: Decimal,
    pub expense_categories: Vec<String>,
    pub income_categories: Vec<String>,
    pub quick_expense_categories: Vec<String>,
    /// Quick-entry labels stored under a budget category, e.g. `Coffee` -> `Food`.
    pub quick_category_aliases: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: "finance.db".into(),
            pool_size: 8,
            busy_timeout_ms: 5_000,
            currency_label: "UAH".into(),
            history_page_size: 5,
            description_max_len: DEFAULT_DESCRIPTION_LIMIT,
            max_amount: Decimal::from(DEFAULT_MAX_AMOUNT),
            expense_categories: strings(&[
                "Food",
                "Transport",
                "Housing",
                "Clothing",
                "Health",
                "Entertainment",
                "Education",
                "Other",
            ]),
            income_categories: strings(&["Salary", "Bonus", "Gift", "Investments", "Other"]),
            quick_expense_categories: strings(&[
                "Food",
                "Coffee",
                "Transport",
                "Entertainment",
                "Housing",
                "Health",
            ]),
            quick_category_aliases: BTreeMap::from([("Coffee".to_string(), "Food".to_string())]),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.history_page_size == 0 {
            return Err(LedgerError::Config("history_page_size must be positive".into()));
        }
        if self.pool_size == 0 {
            return Err(LedgerError::Config("pool_size must be positive".into()));
        }
        if self.max_amount <= Decimal::ZERO {
            return Err(LedgerError::Config("max_amount must be positive".into()));
        }
        if self.expense_categories.is_empty() || self.income_categories.is_empty() {
            return Err(LedgerError::Config("category lists must not be empty".into()));
        }
        Ok(())
    }

    /// Database path: `$FINTRACK_DB`, else `database_file` resolved against `base`.
    pub fn database_path(&self, base: &Path) -> PathBuf {
        if let Some(custom) = env::var_os(DB_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(custom);
        }
        let file = Path::new(&self.database_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            base.join(file)
        }
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            pool_size: self.pool_size,
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }

    /// Budget category a quick-entry label is recorded under.
    pub fn resolve_quick_category<'a>(&'a self, label: &'a str) -> &'a str {
        self.quick_category_aliases
            .get(label)
            .map(String::as_str)
            .unwrap_or(label)
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at the application directory.
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            debug!(path = %self.path.display(), "no config file, using defaults");
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.resolve_quick_category("Coffee"), "Food");
        assert_eq!(config.resolve_quick_category("Transport"), "Transport");
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.currency_label = "EUR".into();
        config.history_page_size = 10;
        manager.save(&config).unwrap();
        assert!(!dir.path().join("config.json.tmp").exists());
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "currency_label": "USD" }"#).unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency_label, "USD");
        assert_eq!(config.history_page_size, 5);
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let config = Config {
            history_page_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn relative_database_file_resolves_against_base() {
        let config = Config::default();
        let base = Path::new("/tmp/fintrack-home");
        if env::var_os(DB_ENV).is_none() {
            assert_eq!(config.database_path(base), base.join("finance.db"));
        }
    }
}
