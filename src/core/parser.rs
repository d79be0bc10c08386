//! FSC-002: Settings and target-list parsing.
//!
//! Settings are an optional YAML file naming the three artifacts. The target
//! list is line-oriented: one double-quoted path per line, with blank lines
//! and `#` comments skipped.

use super::types::ArtifactPaths;
use crate::error::FscError;
use std::path::{Path, PathBuf};

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a settings file from disk.
pub fn parse_settings_file(path: &Path) -> Result<ArtifactPaths, FscError> {
    let content = std::fs::read_to_string(path).map_err(|e| FscError::ArtifactRead {
        what: "settings file",
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_settings(&content).map_err(|reason| FscError::Settings {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse settings from a YAML string. An empty document yields the defaults.
pub fn parse_settings(yaml: &str) -> Result<ArtifactPaths, String> {
    if yaml.trim().is_empty() {
        return Ok(ArtifactPaths::default());
    }
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate artifact locations. Returns a list of errors (empty = valid).
pub fn validate_settings(paths: &ArtifactPaths) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let named = [
        ("targets", &paths.targets),
        ("database", &paths.database),
        ("auth_tag", &paths.auth_tag),
    ];

    for (name, path) in &named {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError {
                message: format!("{} path must not be empty", name),
            });
        }
    }

    for (i, (a_name, a_path)) in named.iter().enumerate() {
        for (b_name, b_path) in &named[i + 1..] {
            if !a_path.as_os_str().is_empty() && a_path == b_path {
                errors.push(ValidationError {
                    message: format!(
                        "{} and {} both point at {}",
                        a_name,
                        b_name,
                        a_path.display()
                    ),
                });
            }
        }
    }

    errors
}

/// Read the target list from disk.
pub fn parse_target_list_file(path: &Path) -> Result<Vec<PathBuf>, FscError> {
    let content = std::fs::read_to_string(path).map_err(|e| FscError::ArtifactRead {
        what: "target list",
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_target_list(&content).map_err(|(line, reason)| FscError::TargetList {
        path: path.to_path_buf(),
        line,
        reason,
    })
}

/// Parse target-list text. Errors carry the 1-based line number.
pub fn parse_target_list(text: &str) -> Result<Vec<PathBuf>, (usize, String)> {
    let mut targets = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let rest = line
            .strip_prefix('"')
            .ok_or_else(|| (line_no, "path must be enclosed in double quotes".to_string()))?;
        let end = rest
            .find('"')
            .ok_or_else(|| (line_no, "missing closing quote".to_string()))?;
        let path = &rest[..end];
        if path.is_empty() {
            return Err((line_no, "empty path".to_string()));
        }
        if !rest[end + 1..].trim().is_empty() {
            return Err((line_no, "unexpected text after closing quote".to_string()));
        }
        targets.push(PathBuf::from(path));
    }

    Ok(targets)
}
