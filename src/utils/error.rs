use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Consent wall detected, request was redirected to {url}")]
    ConsentWallError { url: String },

    #[error("No table found in page (debug HTML: {debug_path})")]
    TableNotFoundError { debug_path: String },

    #[error("Table contained no valid stock rows (debug HTML: {debug_path})")]
    EmptyTableError { debug_path: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid email address: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    MessageError(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Failed to read attachment {path}: {source}")]
    AttachmentError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Mail error: {message}")]
    MailError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Fetch,
    Extract,
    Persist,
    Notify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::HttpError(_)
            | ReportError::HttpStatusError { .. }
            | ReportError::ConsentWallError { .. } => ErrorCategory::Fetch,
            ReportError::TableNotFoundError { .. } | ReportError::EmptyTableError { .. } => {
                ErrorCategory::Extract
            }
            ReportError::CsvError(_)
            | ReportError::SpreadsheetError(_)
            | ReportError::IoError(_) => ErrorCategory::Persist,
            ReportError::AddressError(_)
            | ReportError::MessageError(_)
            | ReportError::SmtpError(_)
            | ReportError::AttachmentError { .. }
            | ReportError::MailError { .. } => ErrorCategory::Notify,
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 外部服務問題，稍後重跑即可
            ErrorCategory::Fetch | ErrorCategory::Notify => ErrorSeverity::Medium,
            ErrorCategory::Extract => ErrorSeverity::High,
            ErrorCategory::Config | ErrorCategory::Persist => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the failed stage.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config => 2,
            ErrorCategory::Fetch => 3,
            ErrorCategory::Extract => 4,
            ErrorCategory::Persist => 5,
            ErrorCategory::Notify => 6,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::ConsentWallError { .. } => {
                "The site now requires consent management; consider an API or another data source"
            }
            ReportError::HttpStatusError { .. } | ReportError::HttpError(_) => {
                "Check network connectivity and that the listing URL is reachable"
            }
            ReportError::TableNotFoundError { .. } | ReportError::EmptyTableError { .. } => {
                "The page layout may have changed; inspect the saved debug HTML"
            }
            ReportError::SmtpError(_) => {
                "Verify SENDER_EMAIL / APP_PASSWORD and that the SMTP host accepts STARTTLS"
            }
            ReportError::AddressError(_) => "Check the sender and recipient email addresses",
            ReportError::MissingConfigError { .. } => {
                "Set the missing value in the environment or a .env file, or run with --no-email"
            }
            ReportError::ConfigError { .. } | ReportError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line options"
            }
            ReportError::CsvError(_)
            | ReportError::SpreadsheetError(_)
            | ReportError::IoError(_) => "Check that the output directory exists and is writable",
            ReportError::MessageError(_)
            | ReportError::AttachmentError { .. }
            | ReportError::MailError { .. } => "Check the generated report files and mail settings",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        let stage = match self.category() {
            ErrorCategory::Config => "Configuration problem",
            ErrorCategory::Fetch => "Failed to retrieve data",
            ErrorCategory::Extract => "Failed to read the stock table",
            ErrorCategory::Persist => "Failed to save the report",
            ErrorCategory::Notify => "Failed to send the report email",
        };
        format!("{}: {}", stage, self)
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
