use clap::Parser;
use most_active_report::core::extract::Extractor;
use most_active_report::core::notify::Notifier;
use most_active_report::utils::error::ReportError;
use most_active_report::utils::{logger, validation::Validate};
use most_active_report::{
    CliConfig, Fetcher, LocalStorage, MailCredentials, Persister, ReportConfig, ReportEngine,
    SmtpMailer, StockReportPipeline,
};

fn exit_with(e: &ReportError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn build_pipeline(
    config: &ReportConfig,
    no_email: bool,
) -> Result<StockReportPipeline<LocalStorage, SmtpMailer>, ReportError> {
    // 郵件設定缺少時在抓取前就失敗
    let notifier = if no_email {
        None
    } else {
        config.mail.validate()?;
        let credentials = MailCredentials::from_env(&config.mail)?;
        let mailer = SmtpMailer::new(&config.mail, &credentials)?;
        Some(Notifier::new(mailer, credentials.recipient.clone()))
    };

    let storage = LocalStorage::new(config.output.output_path.clone());
    let fetcher = Fetcher::new(config.source.clone())?;
    let extractor = Extractor::new(storage.clone(), config)?;
    let persister = Persister::new(storage, config.output.clone());

    Ok(StockReportPipeline::new(fetcher, extractor, persister, notifier))
}

#[tokio::main]
async fn main() {
    // .env 不存在也沒關係
    let _ = dotenvy::dotenv();

    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);

    tracing::info!("🚀 Starting most-active-report");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let pipeline = match build_pipeline(&config, cli.no_email) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };

    let engine = ReportEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Report completed: {} rows, emailed: {}",
                summary.rows,
                summary.emailed
            );
            println!("✅ Report completed successfully!");
            println!("📁 Excel file: {}", summary.artifacts.spreadsheet_path.display());
        }
        Err(e) => exit_with(&e),
    }
}
