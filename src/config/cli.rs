use crate::config::ReportConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "most-active-report")]
#[command(about = "Scrape the most active stocks listing and email a CSV/XLSX report")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing page URL
    #[arg(long)]
    pub url: Option<String>,

    /// Directory for the report and debug files
    #[arg(long)]
    pub output_path: Option<String>,

    /// Report recipient, overrides RECIPIENT_EMAIL
    #[arg(long)]
    pub recipient: Option<String>,

    #[arg(long)]
    pub smtp_host: Option<String>,

    #[arg(long)]
    pub smtp_port: Option<u16>,

    /// Write the report files but do not send the email
    #[arg(long)]
    pub no_email: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// Defaults, then the config file (if any), then command line overrides.
    pub fn load_config(&self) -> Result<ReportConfig> {
        let config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                ReportConfig::from_file(path)?
            }
            None => ReportConfig::default(),
        };
        Ok(self.apply_overrides(config))
    }

    pub fn apply_overrides(&self, mut config: ReportConfig) -> ReportConfig {
        if let Some(url) = &self.url {
            config.source.url = url.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
        if let Some(recipient) = &self.recipient {
            config.mail.recipient = Some(recipient.clone());
        }
        if let Some(host) = &self.smtp_host {
            config.mail.host = host.clone();
        }
        if let Some(port) = self.smtp_port {
            config.mail.port = port;
        }
        config
    }
}
