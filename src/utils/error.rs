use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF rendering error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Catalog item not found: {}{name}", line_prefix(.line))]
    UnknownCatalogItem { name: String, line: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    FileSystem,
    Configuration,
    Input,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EstimateError {
    pub fn validation(message: impl Into<String>) -> Self {
        EstimateError::ValidationError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        EstimateError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EstimateError::HttpError(_) => ErrorCategory::Network,
            EstimateError::CsvError(_)
            | EstimateError::SerializationError(_)
            | EstimateError::ProcessingError { .. } => ErrorCategory::Data,
            EstimateError::IoError(_) | EstimateError::ZipError(_) => ErrorCategory::FileSystem,
            EstimateError::ConfigError { .. }
            | EstimateError::InvalidConfigValueError { .. }
            | EstimateError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EstimateError::ValidationError { .. } | EstimateError::UnknownCatalogItem { .. } => {
                ErrorCategory::Input
            }
            EstimateError::PdfError(_) => ErrorCategory::Rendering,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::FileSystem | ErrorCategory::Rendering => ErrorSeverity::Critical,
        }
    }

    /// CLI 結束碼：網路 2、輸入/設定/資料 1、檔案系統/輸出 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EstimateError::HttpError(_) => {
                "Check the catalog URL and network connection, then retry"
            }
            EstimateError::CsvError(_) => {
                "Make sure the catalog is a CSV file with the expected column headers"
            }
            EstimateError::IoError(_) => "Check that the path exists and is writable",
            EstimateError::ZipError(_) => "Check free disk space in the output directory",
            EstimateError::SerializationError(_) => "Report this as a bug",
            EstimateError::PdfError(_) => "Try exporting without the pdf format",
            EstimateError::ConfigError { .. }
            | EstimateError::InvalidConfigValueError { .. }
            | EstimateError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            EstimateError::ProcessingError { .. } => "Check the catalog contents",
            EstimateError::ValidationError { .. } => {
                "Quantities and rates must be non-negative numbers"
            }
            EstimateError::UnknownCatalogItem { .. } => {
                "Use `browse` to look up the exact item name"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EstimateError::HttpError(_) => "Could not download the catalog".to_string(),
            EstimateError::CsvError(e) => format!("The catalog could not be read: {}", e),
            EstimateError::IoError(e) => format!("File access failed: {}", e),
            EstimateError::UnknownCatalogItem { name, line } => {
                format!("{}'{}' is not in the catalog", line_prefix(line), name)
            }
            other => other.to_string(),
        }
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|line| format!("line {}: ", line)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, EstimateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_input_category() {
        let err = EstimateError::validation("Quantity must be a number");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.to_string(),
            "Validation error: Quantity must be a number"
        );
    }

    #[test]
    fn test_unknown_item_message() {
        let err = EstimateError::UnknownCatalogItem {
            name: "Teak door".to_string(),
            line: None,
        };
        assert_eq!(err.user_friendly_message(), "'Teak door' is not in the catalog");
        assert_eq!(err.to_string(), "Catalog item not found: Teak door");

        let err = EstimateError::UnknownCatalogItem {
            name: "Teak door".to_string(),
            line: Some(4),
        };
        assert_eq!(
            err.user_friendly_message(),
            "line 4: 'Teak door' is not in the catalog"
        );
        assert_eq!(err.to_string(), "Catalog item not found: line 4: Teak door");
    }

    #[test]
    fn test_every_failure_exits_non_zero() {
        let errors = [
            EstimateError::validation("bad quantity"),
            EstimateError::processing("no rows"),
            EstimateError::MissingConfigError {
                field: "catalog.source".to_string(),
            },
            EstimateError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
            EstimateError::from(zip::result::ZipError::FileNotFound),
        ];
        let codes: Vec<i32> = errors.iter().map(EstimateError::exit_code).collect();
        assert_eq!(codes, vec![1, 1, 1, 3, 3]);
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = EstimateError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
