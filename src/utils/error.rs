use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input file '{path}': {message}")]
    InputFormatError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Command '{command}' failed ({status}): {stderr}")]
    CommandError {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Gateway returned HTTP {status}: {body}")]
    GatewayStatusError { status: u16, body: String },

    #[error("No CID in response: {message}")]
    MissingCidError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Ipfs,
    FileSystem,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InputFormatError { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Input
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::GatewayStatusError { .. } => ErrorCategory::Network,
            EtlError::CommandError { .. } | EtlError::MissingCidError { .. } => ErrorCategory::Ipfs,
            EtlError::IoError(_) => ErrorCategory::FileSystem,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Ipfs | ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::FileSystem => ErrorSeverity::Critical,
        }
    }

    /// 暫時性錯誤（非 200 回應或傳輸層錯誤）才值得重試
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EtlError::ApiError(_) | EtlError::GatewayStatusError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that the input file exists and holds a JSON array of objects",
            ErrorCategory::Configuration => "Review the CLI flags or the TOML configuration file",
            ErrorCategory::Network => "Check the gateway endpoint, credentials and network connectivity",
            ErrorCategory::Ipfs => "Make sure the ipfs CLI is installed and the local daemon is running",
            ErrorCategory::FileSystem => "Check permissions and free space for the split and output paths",
            ErrorCategory::Processing => "Inspect the failing record in the input file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read the input records: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Network => format!("Upload to the IPFS gateway failed: {}", self),
            ErrorCategory::Ipfs => format!("Local IPFS node error: {}", self),
            ErrorCategory::FileSystem => format!("File system error: {}", self),
            ErrorCategory::Processing => format!("Processing error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
