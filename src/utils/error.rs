use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file is empty")]
    EmptyFile,

    #[error("Input file contains no usable rows")]
    NoData,

    #[error("Required column is missing from header: {column}")]
    MissingColumn { column: String },

    #[error("Unknown currency code: {code}")]
    UnknownCurrency { code: String },

    #[error("Invalid value '{value}' in field '{field}': {reason}")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 單筆資料錯誤，略過該列
    Low,
    /// 輸入檔案無資料
    Medium,
    /// 設定錯誤
    High,
    /// 系統錯誤 (IO、壓縮)
    Critical,
}

impl StatsError {
    /// 是否為單列錯誤 (呼叫端略過該列，不中止流程)
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            StatsError::UnknownCurrency { .. } | StatsError::InvalidField { .. }
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StatsError::UnknownCurrency { .. } | StatsError::InvalidField { .. } => {
                ErrorSeverity::Low
            }
            StatsError::EmptyFile | StatsError::NoData | StatsError::MissingColumn { .. } => {
                ErrorSeverity::Medium
            }
            StatsError::ConfigError { .. }
            | StatsError::ConfigValidationError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => ErrorSeverity::High,
            StatsError::ZipError(_)
            | StatsError::CsvError(_)
            | StatsError::IoError(_)
            | StatsError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 根據嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StatsError::EmptyFile => "The input file is empty".to_string(),
            StatsError::NoData => "No data: every row was incomplete or invalid".to_string(),
            StatsError::MissingColumn { column } => {
                format!("The input file has no '{}' column", column)
            }
            StatsError::IoError(e) => format!("Could not access a file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.severity() {
            ErrorSeverity::Low => "The offending row was skipped",
            ErrorSeverity::Medium => {
                "Check that the CSV has a header row and at least one complete vacancy row"
            }
            ErrorSeverity::High => "Fix the configuration value and run again",
            ErrorSeverity::Critical => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
