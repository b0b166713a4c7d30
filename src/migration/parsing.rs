use crate::constants::BASELINE_FILENAME_PREFIX;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Represents a parsed migration file
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParsedMigration {
    pub path: PathBuf,
    pub version: u64,
    pub description: String,
}

/// Represents a parsed baseline file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBaseline {
    pub path: PathBuf,
    pub version: u64,
}

/// Parse a migration filename like "V1734567890_add_user_index.sql" or "1734567890_add_user_index.sql"
/// Accepts files with or without the V prefix for backwards compatibility.
pub fn parse_migration_filename(filename: &str) -> Option<(u64, String)> {
    if !filename.ends_with(".sql") {
        return None;
    }

    let name_without_ext = &filename[..filename.len() - 4]; // Remove ".sql"

    // Strip optional V prefix
    let name_without_prefix = name_without_ext
        .strip_prefix('V')
        .unwrap_or(name_without_ext);

    let parts: Vec<&str> = name_without_prefix.splitn(2, '_').collect();

    if parts.len() != 2 {
        return None;
    }

    let version = parts[0].parse::<u64>().ok()?;
    let description = parts[1].to_string();

    Some((version, description))
}

/// Parse a baseline filename like "baseline_V1734567890.sql"
pub fn parse_baseline_filename(filename: &str) -> Option<u64> {
    if !filename.starts_with(BASELINE_FILENAME_PREFIX) || !filename.ends_with(".sql") {
        return None;
    }

    let version_str = filename
        .strip_prefix(BASELINE_FILENAME_PREFIX)?
        .strip_suffix(".sql")?;

    version_str.parse::<u64>().ok()
}

/// Generate a baseline filename from version
pub fn generate_baseline_filename(version: u64) -> String {
    format!("{}{}.sql", BASELINE_FILENAME_PREFIX, version)
}

/// Find all migration files in a directory and return them sorted by version
pub fn discover_migrations(migrations_dir: &Path) -> Result<Vec<ParsedMigration>> {
    let mut migrations = Vec::new();

    if !migrations_dir.exists() {
        return Ok(migrations);
    }

    for entry in std::fs::read_dir(migrations_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "sql")
            && let Some(filename) = path.file_name().and_then(|n| n.to_str())
            && let Some((version, description)) = parse_migration_filename(filename)
        {
            migrations.push(ParsedMigration {
                path,
                version,
                description,
            });
        }
    }

    // Sort by version (chronological order)
    migrations.sort_by_key(|m| m.version);

    Ok(migrations)
}

/// Find all baseline files in a directory and return them sorted by version
pub fn discover_baselines(baselines_dir: &Path) -> Result<Vec<ParsedBaseline>> {
    let mut baselines = Vec::new();

    if !baselines_dir.exists() {
        return Ok(baselines);
    }

    for entry in std::fs::read_dir(baselines_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "sql")
            && let Some(filename) = path.file_name().and_then(|n| n.to_str())
            && let Some(version) = parse_baseline_filename(filename)
        {
            baselines.push(ParsedBaseline { path, version });
        }
    }

    // Sort by version (chronological order)
    baselines.sort_by_key(|b| b.version);

    Ok(baselines)
}

/// Find the latest migration file in a directory
pub fn find_latest_migration(migrations_dir: &Path) -> Result<Option<ParsedMigration>> {
    let migrations = discover_migrations(migrations_dir)?;
    Ok(migrations.last().cloned())
}

/// Find the latest baseline file in a directory
pub fn find_latest_baseline(baselines_dir: &Path) -> Result<Option<ParsedBaseline>> {
    let baselines = discover_baselines(baselines_dir)?;
    Ok(baselines.last().cloned())
}

/// Find migrations that have a version less than the target version
pub fn find_migrations_before_version(
    migrations_dir: &Path,
    target_version: u64,
) -> Result<Vec<ParsedMigration>> {
    let migrations = discover_migrations(migrations_dir)?;
    Ok(migrations
        .into_iter()
        .filter(|m| m.version < target_version)
        .collect())
}

/// Find the baseline that should be used for a specific migration version
/// (i.e., the latest baseline that has a version less than the target version)
pub fn find_baseline_for_version(
    baselines_dir: &Path,
    target_version: u64,
) -> Result<Option<ParsedBaseline>> {
    let baselines = discover_baselines(baselines_dir)?;

    // Find the latest baseline that is less than the target version
    let previous_baseline = baselines
        .iter()
        .rev()
        .find(|b| b.version < target_version)
        .cloned();

    Ok(previous_baseline)
}

/// Find a migration by version string (supports full and partial matches)
pub fn find_migration_by_version(
    migrations_dir: &Path,
    version_str: &str,
) -> Result<Option<ParsedMigration>> {
    let migrations = discover_migrations(migrations_dir)?;

    // Remove 'V' prefix if present
    let version_str = version_str.strip_prefix("V").unwrap_or(version_str);

    // Try exact version match first
    if let Ok(exact_version) = version_str.parse::<u64>()
        && let Some(migration) = migrations.iter().find(|m| m.version == exact_version)
    {
        return Ok(Some(migration.clone()));
    }

    // Try partial match (find migrations that start with the given string)
    let matching_migrations: Vec<_> = migrations
        .iter()
        .filter(|m| m.version.to_string().starts_with(version_str))
        .collect();

    match matching_migrations.len() {
        0 => Ok(None),
        1 => Ok(Some(matching_migrations[0].clone())),
        _ => {
            // Multiple matches - return an error with suggestions
            let versions: Vec<String> = matching_migrations
                .iter()
                .map(|m| m.version.to_string())
                .collect();
            Err(anyhow::anyhow!(
                "Ambiguous migration version '{}'. Matches: {}. Please be more specific.",
                version_str,
                versions.join(", ")
            ))
        }
    }
}
