use crate::utils::error::{PlotError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let raw = path.to_string_lossy();
    if raw.trim().is_empty() {
        return Err(PlotError::config(field_name, "Path cannot be empty"));
    }

    if raw.contains('\0') {
        return Err(PlotError::config(field_name, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PlotError::config(
            field_name,
            format!("Value {} must be at least {}", value, min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| PlotError::config(field_name, "Missing required key"))
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlotError::config(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Output names become file names, so they may not contain path separators.
pub fn validate_file_stem(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(PlotError::config(
            field_name,
            format!("'{}' is not a valid file name", value),
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
    if !(value >= min && value <= max) {
        return Err(PlotError::config(
            field_name,
            format!("Value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

/// Working points are signal efficiencies strictly inside (0, 1).
pub fn validate_working_point(field_name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(PlotError::config(
            field_name,
            format!("Working point {} must lie strictly between 0 and 1", value),
        ));
    }
    Ok(())
}

pub fn validate_bin_edges(field_name: &str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(PlotError::config(field_name, "At least two bin edges are required"));
    }
    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(PlotError::config(
            field_name,
            "Bin edges must be finite and strictly increasing",
        ));
    }
    Ok(())
}
