#[cfg(feature = "cli")]
pub mod cli;
pub mod env;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use env::MailCredentials;

use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_URL: &str = "https://finance.yahoo.com/most-active";

pub const DEFAULT_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0",
];

/// Full run configuration. Built once at start-up and handed to each stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub mail: MailSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agents: Vec<String>,
    /// Substrings of the final response URL that mark a consent interstitial.
    pub consent_markers: Vec<String>,
    /// CSS selector for the data table; the first `<table>` is used when it matches nothing.
    pub table_selector: String,
    pub initial_delay_ms: u64,
    /// No timeout unless set.
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            consent_markers: vec!["consent.yahoo.com".to_string()],
            table_selector: r#"table[data-test="table"]"#.to_string(),
            initial_delay_ms: 1000,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub file_prefix: String,
    pub debug_file: String,
    pub sheet_name: String,
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            file_prefix: "yahoo_most_active".to_string(),
            debug_file: "yahoo_finance_debug.html".to_string(),
            sheet_name: "Most Active Stocks".to_string(),
            title: "Yahoo Finance Most Active Stocks".to_string(),
        }
    }
}

/// Relay settings. Credentials are never read from the config file, see [`MailCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    /// Overrides `RECIPIENT_EMAIL`.
    pub recipient: Option<String>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            recipient: None,
        }
    }
}

impl ReportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::ConfigError {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RECIPIENT_EMAIL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_non_empty_list("source.user_agents", &self.source.user_agents)?;
        validation::validate_non_empty_string("source.table_selector", &self.source.table_selector)?;
        if scraper::Selector::parse(&self.source.table_selector).is_err() {
            return Err(ReportError::InvalidConfigValueError {
                field: "source.table_selector".to_string(),
                value: self.source.table_selector.clone(),
                reason: "Not a valid CSS selector".to_string(),
            });
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 3600)?;
        }

        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_file_name("output.file_prefix", &self.output.file_prefix)?;
        validation::validate_file_name("output.debug_file", &self.output.debug_file)?;
        validation::validate_non_empty_string("output.sheet_name", &self.output.sheet_name)?;

        Ok(())
    }
}

/// 只有要寄信時才檢查
impl Validate for MailSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("mail.host", &self.host)?;
        validation::validate_range("mail.port", self.port, 1, u16::MAX)?;
        if let Some(recipient) = &self.recipient {
            validation::validate_email("mail.recipient", recipient)?;
        }
        Ok(())
    }
}
