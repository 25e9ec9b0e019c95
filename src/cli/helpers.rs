//! Shared helper functions for CLI commands
//!
//! Workspace/store opening and value parsers used by several command
//! modules.

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::store::VehicleStore;
use crate::core::{Config, Workspace};
use crate::entities::vehicle::{UsageCategory, VehicleColumn, VehicleType};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Locate the workspace and load its layered configuration
pub fn open_workspace(global: &GlobalOpts) -> Result<(Workspace, Config)> {
    let workspace = Workspace::locate(global.workspace.as_deref())?;
    let config = Config::load(Some(&workspace));
    Ok((workspace, config))
}

/// Open the configured vehicle store, creating it on first use
pub fn open_store(workspace: &Workspace, config: &Config) -> Result<VehicleStore> {
    Ok(VehicleStore::open(&config.database_path(workspace))?)
}

/// clap value parser for vehicle types (label or slug)
pub fn parse_vehicle_type(s: &str) -> std::result::Result<VehicleType, String> {
    s.parse().map_err(|e: crate::entities::vehicle::UnknownValue| e.to_string())
}

/// clap value parser for usage categories (label or slug)
pub fn parse_usage(s: &str) -> std::result::Result<UsageCategory, String> {
    s.parse().map_err(|e: crate::entities::vehicle::UnknownValue| e.to_string())
}

/// clap value parser for model years
pub fn parse_year(s: &str) -> std::result::Result<i64, String> {
    let year: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a year", s))?;
    if (1900..=2100).contains(&year) {
        Ok(year)
    } else {
        Err(format!("year {} is outside 1900-2100", year))
    }
}

/// clap value parser for search columns (`owner`, `VEH_ID`, `used-for`, ...)
pub fn parse_column(s: &str) -> std::result::Result<VehicleColumn, String> {
    let normalized = s.trim().to_uppercase().replace('-', "_");
    VehicleColumn::from_name(&normalized).ok_or_else(|| {
        let names: Vec<_> = VehicleColumn::ALL.iter().map(|c| c.name()).collect();
        format!("unknown column '{}' (expected one of: {})", s, names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_parse_vehicle_type() {
        assert_eq!(parse_vehicle_type("compactor").unwrap(), VehicleType::Compactor);
        assert_eq!(parse_vehicle_type("dumper-5m3").unwrap(), VehicleType::Dumper5m3);
        assert!(parse_vehicle_type("bus").unwrap_err().contains("vehicle type"));
    }

    #[test]
    fn test_parse_usage() {
        assert_eq!(
            parse_usage("Bulk Waste Collection").unwrap(),
            UsageCategory::BulkWasteCollection
        );
        assert!(parse_usage("parking").is_err());
    }

    #[test]
    fn test_parse_year_range() {
        assert_eq!(parse_year("2019").unwrap(), 2019);
        assert!(parse_year("1850").is_err());
        assert!(parse_year("soon").is_err());
    }

    #[test]
    fn test_parse_column() {
        assert_eq!(parse_column("owner").unwrap(), VehicleColumn::Owner);
        assert_eq!(parse_column("used-for").unwrap(), VehicleColumn::UsedFor);
        assert_eq!(parse_column("VEH_ID").unwrap(), VehicleColumn::VehId);
        assert!(parse_column("colour").is_err());
    }
}
