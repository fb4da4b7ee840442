//! Build duration resolution from a Maven reactor summary.
//!
//! # Overview
//!
//! Maven ends a multi-module build with a *reactor summary* listing every
//! module by its human-readable project name together with its build time:
//!
//! ```text
//! [INFO] Reactor Summary for DHIS 2.38-SNAPSHOT:
//! [INFO]
//! [INFO] DHIS Support Commons ............................... SUCCESS [  0.980 s]
//! [INFO] DHIS API ........................................... SUCCESS [03:07 min]
//! [INFO] DHIS Web ........................................... SKIPPED
//! [INFO] ------------------------------------------------------------------------
//! [INFO] BUILD SUCCESS
//! ```
//!
//! The dependency graph knows modules by coordinates, not names, so an
//! artifact mapping CSV (`name,coordinate`) bridges the two. The result is a
//! [`ModuleRegistry`] of duration-bearing modules keyed by coordinates.
//!
//! ## Window
//!
//! Lines before the start marker are ignored. The first line after it that
//! contains the end marker closes the window. Inside the window, lines that
//! do not look like `<name> .... STATUS [duration]` are skipped; this covers
//! blank lines, separators and `SKIPPED` modules.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::config::ReactorConfig;
use crate::duration::parse_build_duration;
use crate::error::CriticError;
use crate::module::{Module, ModuleRegistry};

static PROJECT_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\] (.+) \.+[A-Za-z\s\[]+(.+)\]")
        .unwrap_or_else(|e| unreachable!("reactor entry pattern: {e}"))
});

/// Project name → coordinates, as read from the artifact mapping CSV.
pub type ArtifactMapping = HashMap<String, String>;

/// Parse the `name,coordinate` artifact mapping.
///
/// Only the first two comma-separated fields of each line are used, both
/// trimmed. There is no header handling: a header line is simply an extra
/// mapping entry. Blank lines are skipped. A later line with the same name
/// overrides an earlier one.
///
/// # Errors
///
/// Returns [`CriticError::MalformedMapping`] for a non-blank line with fewer
/// than two fields.
pub fn parse_artifact_mapping(content: &str) -> Result<ArtifactMapping, CriticError> {
    let mut mapping = ArtifactMapping::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let (Some(name), Some(coordinates)) = (fields.next(), fields.next()) else {
            return Err(CriticError::MalformedMapping {
                line: idx + 1,
                content: line.to_string(),
            });
        };

        if let Some(previous) = mapping.insert(name.to_string(), coordinates.to_string()) {
            warn!(%name, %previous, %coordinates, "duplicate project name in artifact mapping");
        }
    }

    Ok(mapping)
}

/// Extract `(name, raw duration)` from a reactor summary entry.
///
/// Returns `None` when the line carries no bracketed duration.
#[must_use]
pub fn parse_reactor_summary_entry(line: &str) -> Option<(String, String)> {
    let caps = PROJECT_DURATION.captures(line)?;
    Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

/// Scan build log lines and resolve every reactor summary entry to a
/// duration-bearing [`Module`].
///
/// # Errors
///
/// - [`CriticError::UnknownModuleName`] when an entry's name is not in the
///   mapping.
/// - [`CriticError::InvalidDuration`] when an entry's duration is not in a
///   supported format.
/// - [`CriticError::InvalidCoordinate`] when the mapped coordinates are
///   malformed.
pub fn resolve_durations<I, S>(
    mapping: &ArtifactMapping,
    log_lines: I,
    config: &ReactorConfig,
) -> Result<ModuleRegistry, CriticError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = ModuleRegistry::new();
    let mut in_summary = false;

    for line in log_lines {
        let line = line.as_ref();

        if !in_summary {
            in_summary = line.contains(config.start_marker.as_str());
            continue;
        }

        if line.contains(config.end_marker.as_str()) {
            break;
        }

        let Some((name, raw_duration)) = parse_reactor_summary_entry(line) else {
            continue;
        };

        let coordinates = mapping
            .get(&name)
            .ok_or_else(|| CriticError::UnknownModuleName(name.clone()))?;

        let duration =
            parse_build_duration(&raw_duration).ok_or_else(|| CriticError::InvalidDuration {
                name: name.clone(),
                duration: raw_duration.clone(),
            })?;

        debug!(%name, %coordinates, ?duration, "reactor summary entry");
        registry.insert(Module::with_duration(coordinates, duration)?);
    }

    if !in_summary {
        warn!(
            marker = %config.start_marker,
            "no reactor summary found in build log"
        );
    }

    Ok(registry)
}

/// Read the artifact mapping and build log from disk and resolve durations.
///
/// # Errors
///
/// Returns an error if either file cannot be read or resolution fails.
#[instrument(skip(config))]
pub fn load_durations(
    artifact_mapping: &Path,
    build_log: &Path,
    config: &ReactorConfig,
) -> Result<ModuleRegistry> {
    let mapping_content = std::fs::read_to_string(artifact_mapping)
        .with_context(|| format!("Failed to read {}", artifact_mapping.display()))?;
    let mapping = parse_artifact_mapping(&mapping_content)
        .with_context(|| format!("Failed to parse {}", artifact_mapping.display()))?;

    let log_bytes = std::fs::read(build_log)
        .with_context(|| format!("Failed to read {}", build_log.display()))?;
    let log = String::from_utf8_lossy(&log_bytes);

    let registry = resolve_durations(&mapping, log.lines(), config)
        .with_context(|| format!("Failed to resolve durations from {}", build_log.display()))?;

    debug!(modules = registry.len(), "resolved build durations");
    Ok(registry)
}
