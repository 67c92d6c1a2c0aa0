use crate::core::plan::YEAR_RANGE;
use crate::utils::error::{Result, SstError};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_SCALE: f64 = 1000.0;
pub const DEFAULT_MAX_PIXELS: usize = 10_000_000;
pub const DEFAULT_DESCRIPTION: &str = "Monthly_SST";
pub const VALID_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub job: JobSection,
    pub region: RegionConfig,
    pub catalog: CatalogConfig,
    pub period: PeriodConfig,
    #[serde(default)]
    pub reduction: ReductionConfig,
    pub export: ExportConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSection {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub path: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub band: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub parameters: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub start_year: i32,
    pub end_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    pub scale: f64,
    pub best_effort: bool,
    pub max_pixels: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            best_effort: true,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub description: Option<String>,
    #[serde(default = "default_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

fn default_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl JobConfig {
    /// Load a job from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SstError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse a job from TOML text, substituting `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SstError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SstError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;

        validation::validate_path("region.path", &self.region.path)?;
        validation::validate_file_extensions(
            "region.path",
            &[self.region.path.as_str()],
            &["geojson", "json"],
        )?;

        validation::validate_non_empty_string("catalog.band", &self.catalog.band)?;
        match self.catalog.r#type.as_str() {
            "file" => {
                let path = validation::validate_required_field("catalog.path", &self.catalog.path)?;
                validation::validate_path("catalog.path", path)?;
            }
            "api" => {
                let endpoint =
                    validation::validate_required_field("catalog.endpoint", &self.catalog.endpoint)?;
                validation::validate_url("catalog.endpoint", endpoint)?;
            }
            other => {
                return Err(SstError::InvalidConfigValueError {
                    field: "catalog.type".to_string(),
                    value: other.to_string(),
                    reason: "Catalog type must be 'file' or 'api'".to_string(),
                })
            }
        }

        let (min_year, max_year) = YEAR_RANGE;
        validation::validate_range("period.start_year", self.period.start_year, min_year, max_year)?;
        validation::validate_range("period.end_year", self.period.end_year, min_year, max_year)?;
        if self.period.start_year > self.period.end_year {
            return Err(SstError::ConfigValidationError {
                field: "period".to_string(),
                message: format!(
                    "start_year {} is after end_year {}",
                    self.period.start_year, self.period.end_year
                ),
            });
        }

        validation::validate_positive_f64("reduction.scale", self.reduction.scale)?;
        validation::validate_positive_number("reduction.max_pixels", self.reduction.max_pixels, 1)?;

        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_non_empty_string("export.description", self.description())?;
        if self.export.output_formats.is_empty() {
            return Err(SstError::MissingConfigError {
                field: "export.output_formats".to_string(),
            });
        }
        for format in &self.export.output_formats {
            if !VALID_FORMATS.contains(&format.as_str()) {
                return Err(SstError::InvalidConfigValueError {
                    field: "export.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_FORMATS.join(", ")
                    ),
                });
            }
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if LogFormat::parse(format).is_none() {
                return Err(SstError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Log format must be 'compact' or 'json'".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn output_path(&self) -> &str {
        &self.export.output_path
    }

    /// Export file stem.
    pub fn description(&self) -> &str {
        self.export.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn band(&self) -> &str {
        &self.catalog.band
    }

    pub fn region_name(&self) -> &str {
        self.region.name.as_deref().unwrap_or(&self.job.name)
    }

    pub fn compression_enabled(&self) -> bool {
        self.export
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(LogFormat::parse)
            .unwrap_or_default()
    }
}

impl Validate for JobConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[job]
name = "arabian-sea"

[region]
path = "regions/arabian_sea.geojson"

[catalog]
type = "file"
path = "catalog/modis_aqua.json"
band = "sst"

[period]
start_year = 2003
end_year = 2021

[export]
output_path = "./output"
description = "Arabian_Sea_Monthly_SST"
"#;

    #[test]
    fn test_parse_basic_job_config() {
        let config = JobConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.job.name, "arabian-sea");
        assert_eq!(config.band(), "sst");
        assert_eq!(config.period.start_year, 2003);
        assert_eq!(config.reduction.scale, DEFAULT_SCALE);
        assert!(config.reduction.best_effort);
        assert_eq!(config.export.output_formats, vec!["csv".to_string()]);
        assert_eq!(config.description(), "Arabian_Sea_Monthly_SST");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SST_TEST_CATALOG_ENDPOINT", "https://catalog.example.com/scenes");

        let toml_content = r#"
[job]
name = "env"

[region]
path = "sea.geojson"

[catalog]
type = "api"
endpoint = "${SST_TEST_CATALOG_ENDPOINT}"
band = "sst"

[period]
start_year = 2020
end_year = 2020

[export]
output_path = "./output"
"#;

        let config = JobConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.catalog.endpoint.as_deref(),
            Some("https://catalog.example.com/scenes")
        );
        assert!(config.validate().is_ok());

        std::env::remove_var("SST_TEST_CATALOG_ENDPOINT");
    }

    #[test]
    fn test_inverted_period_is_rejected() {
        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.period.start_year = 2022;
        assert!(matches!(
            config.validate(),
            Err(SstError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.reduction.scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.export.output_formats = vec!["xlsx".to_string()];
        assert!(config.validate().is_err());

        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.catalog.r#type = "ftp".to_string();
        assert!(config.validate().is_err());

        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.catalog.path = None;
        assert!(matches!(
            config.validate(),
            Err(SstError::MissingConfigError { .. })
        ));

        let mut config = JobConfig::from_toml_str(BASIC).unwrap();
        config.period.end_year = 10000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = JobConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "arabian-sea");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = JobConfig::from_toml_str("[job\nname = 1").unwrap_err();
        assert!(matches!(err, SstError::ConfigValidationError { .. }));
    }
}
