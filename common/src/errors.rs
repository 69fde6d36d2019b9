// Error handling framework for fetching, loading and analysing repository data

use thiserror::Error;

/// Upstream API errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid GitHub username '{0}'")]
    InvalidUsername(String),
}

impl FetchError {
    /// Short machine-readable reason, used as a metric label
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::ClientBuild(_) => "client_build",
            FetchError::Transport { .. } => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Decode { .. } => "decode",
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::InvalidUsername(_) => "invalid_username",
        }
    }
}

/// Tabular loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid value '{value}' for column {column} at row {row}")]
    InvalidField {
        column: String,
        row: usize,
        value: String,
    },
}

/// Aggregation engine errors
#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Unparseable date '{value}' at row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("Not enough data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Stars column has zero variance, regression slope is undefined")]
    ZeroVariance,

    #[error("Table is empty")]
    EmptyTable,
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::new("FETCH_ERROR", err.to_string())
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        let code = match err {
            LoadError::Io(_) => "STORAGE_ERROR",
            _ => "LOAD_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let details = match &err {
            AnalysisError::InvalidDate { row, value } => {
                Some(serde_json::json!({ "row": row, "value": value }))
            }
            _ => None,
        };
        let api_err = ApiError::new("ANALYSIS_ERROR", err.to_string());
        match details {
            Some(details) => api_err.with_details(details),
            None => api_err,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new("VALIDATION_ERROR", err.to_string())
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::Csv(err.to_string())
    }
}
