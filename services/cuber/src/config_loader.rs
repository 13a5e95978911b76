//! Loading build specifications from disk.
//!
//! Files may reference environment variables as `${VAR}` or
//! `${VAR:-default}`; they are substituted before parsing. The format is
//! chosen from the extension: `.json` is JSON, anything else is YAML.

use anyhow::{Context, Result};
use minicuber::Specification;
use std::fs;
use std::path::Path;

/// On-disk formats a specification can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

/// Read, expand and parse one specification file.
pub fn load_specification<P: AsRef<Path>>(path: P) -> Result<Specification> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read specification: {}", path.display()))?;

    parse_specification(&content, SpecFormat::from_path(path))
        .with_context(|| format!("Invalid specification: {}", path.display()))
}

/// Expand environment references in `content` and parse it.
pub fn parse_specification(content: &str, format: SpecFormat) -> Result<Specification> {
    let expanded = expand_env_vars(content)?;
    let spec = match format {
        SpecFormat::Yaml => Specification::from_yaml_str(&expanded)?,
        SpecFormat::Json => Specification::from_json_str(&expanded)?,
    };
    Ok(spec)
}

fn expand_env_vars(content: &str) -> Result<String> {
    let expanded = shellexpand::env(content).context("Environment substitution failed")?;
    Ok(expanded.into_owned())
}
