//! Configuration validation rules.
//!
//! - Package names must be non-empty and contain no whitespace
//! - Features need a name and at least one include and one library
//!   subdirectory name
//! - Feature names must be unique
//! - The subsystem must name an msystem and a compiler
//! - Extra build variables must be valid shell identifiers

use crate::config::schema::ForgelineConfig;
use crate::error::{ForgelineError, Result};
use std::collections::HashSet;

/// Collect every validation problem in `config`.
pub fn validate_config(config: &ForgelineConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.subsystem.msystem.trim().is_empty() {
        errors.push("subsystem.msystem must not be empty".to_string());
    }
    if config.subsystem.compiler.trim().is_empty() {
        errors.push("subsystem.compiler must not be empty".to_string());
    }

    let feature_packages = config.features.iter().flat_map(|f| f.packages.iter());
    for package in config.packages.iter().chain(feature_packages) {
        if package.is_empty() || package.chars().any(char::is_whitespace) {
            errors.push(format!("invalid package name '{}'", package));
        }
    }

    let mut seen = HashSet::new();
    for feature in &config.features {
        if feature.name.trim().is_empty() {
            errors.push("every feature needs a name".to_string());
            continue;
        }
        if !seen.insert(feature.name.as_str()) {
            errors.push(format!("feature '{}' is defined twice", feature.name));
        }
        if feature.include_dirs.is_empty() {
            errors.push(format!(
                "feature '{}' needs at least one include_dirs entry",
                feature.name
            ));
        }
        if feature.lib_dirs.is_empty() {
            errors.push(format!(
                "feature '{}' needs at least one lib_dirs entry",
                feature.name
            ));
        }
    }

    for key in config.build.env.keys() {
        if !is_identifier(key) {
            errors.push(format!("build.env key '{}' is not a valid variable name", key));
        }
    }

    if config.build.jobs == Some(0) {
        errors.push("build.jobs must be at least 1".to_string());
    }

    errors
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Validate a configuration, failing with every problem found.
pub fn validate(config: &ForgelineConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ForgelineError::ConfigValidationError {
            message: errors.join("; "),
        })
    }
}
