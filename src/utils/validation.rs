use crate::utils::error::{CoauthorError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> CoauthorError {
    CoauthorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
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

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CoauthorError::MissingConfigError {
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

/// Author lists may not contain blank entries.
pub fn validate_author_names(field_name: &str, names: &[String]) -> Result<()> {
    for name in names {
        validate_non_empty_string(field_name, name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.base_url", "https://dblp.org").is_ok());
        assert!(validate_url("source.base_url", "http://dblp.uni-trier.de").is_ok());
        assert!(validate_url("source.base_url", "").is_err());
        assert!(validate_url("source.base_url", "dblp.org").is_err());
        assert!(validate_url("source.base_url", "ftp://dblp.org").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("output.top_k", 5, 1).is_ok());
        assert!(validate_positive_number("output.top_k", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("traversal.depth", 2usize, 0, 4).is_ok());
        assert!(validate_range("traversal.depth", 9usize, 0, 4).is_err());
    }

    #[test]
    fn test_validate_author_names_rejects_blank_entries() {
        let names = vec!["Tim Menzies".to_string(), "  ".to_string()];
        assert!(validate_author_names("seeds.authors", &names).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let missing: Option<String> = None;
        let err = validate_required_field("seeds", &missing).unwrap_err();
        assert!(matches!(err, CoauthorError::MissingConfigError { .. }));
    }
}
