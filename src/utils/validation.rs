use crate::utils::error::{Result, SstError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> SstError {
    SstError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_positive_f64(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            field_name,
            value,
            "Value must be a finite number greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(invalid(
                    field_name,
                    file,
                    format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                ))
            }
            None => {
                return Err(invalid(
                    field_name,
                    file,
                    "File has no extension or invalid filename",
                ))
            }
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| SstError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("catalog.endpoint", "https://example.com").is_ok());
        assert!(validate_url("catalog.endpoint", "http://example.com").is_ok());
        assert!(validate_url("catalog.endpoint", "").is_err());
        assert!(validate_url("catalog.endpoint", "invalid-url").is_err());
        assert!(validate_url("catalog.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_f64() {
        assert!(validate_positive_f64("reduction.scale", 1000.0).is_ok());
        assert!(validate_positive_f64("reduction.scale", 0.0).is_err());
        assert!(validate_positive_f64("reduction.scale", -5.0).is_err());
        assert!(validate_positive_f64("reduction.scale", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("region.path", &["sea.geojson"], &["geojson", "json"]).is_ok());
        assert!(validate_file_extensions("region.path", &["sea.shp"], &["geojson", "json"]).is_err());
        assert!(validate_file_extensions("region.path", &["sea"], &["geojson", "json"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("period.start_year", 2003, 1000, 9999).is_ok());
        assert!(validate_range("period.start_year", 999, 1000, 9999).is_err());
    }
}
