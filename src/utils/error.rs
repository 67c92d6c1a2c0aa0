use thiserror::Error;

#[derive(Error, Debug)]
pub enum SstError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Catalog request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Region error: {message}")]
    RegionError { message: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Reduction error: {message}")]
    ReductionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SstError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SstError::ConfigValidationError { .. }
            | SstError::InvalidConfigValueError { .. }
            | SstError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SstError::RegionError { .. } | SstError::CatalogError { .. } => ErrorCategory::Input,
            SstError::SerializationError(_) => ErrorCategory::Input,
            SstError::ApiError(_) => ErrorCategory::Network,
            SstError::ReductionError { .. } => ErrorCategory::Processing,
            SstError::ZipError(_) | SstError::CsvError(_) | SstError::IoError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SstError::ConfigValidationError { .. }
            | SstError::InvalidConfigValueError { .. }
            | SstError::MissingConfigError { .. } => {
                "Check the job file against the documented [job], [region], [catalog], [period], [reduction] and [export] sections"
            }
            SstError::RegionError { .. } => {
                "Make sure the region file is GeoJSON containing at least one Polygon or MultiPolygon"
            }
            SstError::CatalogError { .. } | SstError::SerializationError(_) => {
                "Make sure the scene manifest is valid JSON with an 'acquired' timestamp and band grids per scene"
            }
            SstError::ApiError(_) => "Check the catalog endpoint is reachable and try again",
            SstError::ReductionError { .. } => {
                "Increase reduction.scale or reduction.max_pixels, or enable reduction.best_effort"
            }
            SstError::ZipError(_) | SstError::CsvError(_) | SstError::IoError(_) => {
                "Check that export.output_path exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid job configuration: {}", self),
            ErrorCategory::Input => format!("Could not load input data: {}", self),
            ErrorCategory::Network => format!("Could not reach the scene catalog: {}", self),
            ErrorCategory::Processing => format!("Monthly reduction failed: {}", self),
            ErrorCategory::Output => format!("Could not write the export: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SstError>;
