use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use crate::yahoo::ProviderSettings;
use crate::Result;

/// Configuration for the sector dashboard
/// Can be loaded from a TOML file to set default values for CLI parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default primary fund
    pub etf: Option<String>,

    /// Default comparison fund
    pub compare: Option<String>,

    /// Default comparison table output file
    pub output: Option<String>,

    /// Default price history output file
    pub prices_output: Option<String>,

    /// Force overwrite without prompting
    pub force: Option<bool>,

    /// Verbose mode
    pub verbose: Option<bool>,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Chart panel size
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartConfig {
    pub width: Option<u16>,
    pub height: Option<u16>,
}

/// Market-data provider overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub cookie_url: Option<String>,
    pub user_agent: Option<String>,
    pub news_count: Option<u32>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Other(format!("Failed to parse config file: {}", e)))?;
        Ok(config)
    }

    /// Load configuration from default locations
    /// Checks in order:
    /// 1. ./.sector_dashboard.toml (current directory)
    /// 2. ~/.config/sector_dashboard/config.toml (user config directory)
    /// 3. ~/.sector_dashboard.toml (home directory)
    pub fn load_default() -> Result<Option<Self>> {
        // Check current directory
        let current_dir_config = PathBuf::from(".sector_dashboard.toml");
        if current_dir_config.exists() {
            return Ok(Some(Self::from_file(current_dir_config)?));
        }

        // Check user config directory
        if let Some(config_dir) = Self::get_config_dir() {
            let config_path = config_dir.join("sector_dashboard").join("config.toml");
            if config_path.exists() {
                return Ok(Some(Self::from_file(config_path)?));
            }
        }

        // Check home directory
        if let Some(home_dir) = Self::get_home_dir() {
            let home_config = home_dir.join(".sector_dashboard.toml");
            if home_config.exists() {
                return Ok(Some(Self::from_file(home_config)?));
            }
        }

        Ok(None)
    }

    /// Get the user's config directory
    fn get_config_dir() -> Option<PathBuf> {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(config_dir))
        } else {
            Self::get_home_dir().map(|home_dir| home_dir.join(".config"))
        }
    }

    /// Get the user's home directory
    fn get_home_dir() -> Option<PathBuf> {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from)
    }

    /// Merge config with CLI arguments, giving CLI arguments priority
    pub fn merge_with_cli(&self, cli_args: &mut crate::cli::Args) {
        if cli_args.etf.is_none() {
            cli_args.etf = self.etf.clone();
        }

        if cli_args.compare.is_none() {
            cli_args.compare = self.compare.clone();
        }

        if cli_args.output.is_none() {
            cli_args.output = self.output.clone();
        }

        if cli_args.prices_output.is_none() {
            cli_args.prices_output = self.prices_output.clone();
        }

        // Booleans: only set from config if CLI flag wasn't explicitly set
        if !cli_args.force && self.force == Some(true) {
            cli_args.force = true;
        }

        if !cli_args.verbose && self.verbose == Some(true) {
            cli_args.verbose = true;
        }

        if cli_args.width.is_none() {
            cli_args.width = self.chart.width;
        }
        if cli_args.height.is_none() {
            cli_args.height = self.chart.height;
        }
        if cli_args.news_count.is_none() {
            cli_args.news_count = self.provider.news_count;
        }
    }

    /// Provider settings with config overrides applied over the defaults
    pub fn provider_settings(&self) -> ProviderSettings {
        let defaults = ProviderSettings::default();
        ProviderSettings {
            base_url: self.provider.base_url.clone().unwrap_or(defaults.base_url),
            cookie_url: self.provider.cookie_url.clone().unwrap_or(defaults.cookie_url),
            user_agent: self.provider.user_agent.clone().unwrap_or(defaults.user_agent),
            news_count: self.provider.news_count.unwrap_or(defaults.news_count),
        }
    }
}
