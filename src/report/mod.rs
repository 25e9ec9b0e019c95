//! PDF vehicle reports
//!
//! Rendering is a pure function of the row set, a title and
//! [`ReportOptions`]; only [`write_report`] touches the filesystem.

pub mod layout;
pub mod logo;
pub mod metrics;
pub mod pdf;

pub use logo::Logo;

use chrono::NaiveDateTime;
use miette::Diagnostic;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::PRODUCT_LABEL;
use crate::core::store::KEY_COLUMN;
use crate::entities::vehicle::{StoredVehicle, VehicleColumn};

/// Header of the 1-based serial number column
pub const SERIAL_COLUMN: &str = "SR.";

/// Rows handed to the renderer, columns known only at runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Stored rows as the store returns them, internal key included
    pub fn from_vehicles(vehicles: &[StoredVehicle]) -> Self {
        let columns = std::iter::once(KEY_COLUMN.to_string())
            .chain(VehicleColumn::ALL.iter().map(|c| c.name().to_string()))
            .collect();
        let rows = vehicles
            .iter()
            .map(|v| {
                std::iter::once(v.key.to_string())
                    .chain(VehicleColumn::ALL.iter().map(|&c| v.record.value(c)))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Drop the internal key column, if present
    pub fn without_key(mut self) -> Self {
        if let Some(idx) = self.columns.iter().position(|c| c == KEY_COLUMN) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything a report needs besides its rows and title
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub generated_at: NaiveDateTime,
    pub logo: Option<Logo>,
    pub footer_label: String,
}

impl ReportOptions {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            logo: None,
            footer_label: PRODUCT_LABEL.to_string(),
        }
    }

    pub fn with_logo(mut self, logo: Option<Logo>) -> Self {
        self.logo = logo;
        self
    }

    pub fn with_footer_label(mut self, label: impl Into<String>) -> Self {
        self.footer_label = label.into();
        self
    }
}

/// Which filter produced a report; names the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    VehicleType,
    Usage,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::VehicleType => "vehicle_type",
            ReportKind::Usage => "usage",
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("cannot write report to {path:?}: {source}")]
    #[diagnostic(
        code(fleet::report::io),
        help("check that the reports directory is writable, or pass --output-dir")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render a report to PDF bytes
///
/// An empty table still yields a one-page report with a notice in place of
/// the table.
pub fn render(table: &ReportTable, title: &str, options: &ReportOptions) -> Vec<u8> {
    let table = table.clone().without_key();
    let mut document = layout::lay_out(&table, title, options);
    document.resolve_page_labels();
    document.to_bytes()
}

/// `{kind}_report_{YYYYMMDD_HHMMSS}.pdf`
pub fn report_file_name(kind: ReportKind, at: NaiveDateTime) -> String {
    format!("{}_report_{}.pdf", kind.as_str(), at.format("%Y%m%d_%H%M%S"))
}

/// Render and write a report into `dir`, returning the file path
///
/// Two reports of the same kind within one second overwrite each other.
pub fn write_report(
    dir: &Path,
    kind: ReportKind,
    table: &ReportTable,
    title: &str,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(report_file_name(kind, options.generated_at));
    let bytes = render(table, title, options);
    fs::write(&path, &bytes).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        bytes = bytes.len(),
        "report written"
    );
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::vehicle::{VehicleRecord, VehicleType};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    pub(crate) fn options() -> ReportOptions {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        ReportOptions::new(at).with_footer_label("Vehicle Management System | Test Org")
    }

    /// `n` compactors, already stripped of the key column
    pub(crate) fn sample_table(n: u64) -> ReportTable {
        let vehicles: Vec<StoredVehicle> = (1..=n)
            .map(|i| StoredVehicle {
                key: i as i64,
                record: VehicleRecord::placeholder(VehicleType::Compactor, i),
            })
            .collect();
        ReportTable::from_vehicles(&vehicles).without_key()
    }

    fn pdf_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_from_vehicles_strips_key() {
        let vehicles = vec![StoredVehicle {
            key: 42,
            record: VehicleRecord::placeholder(VehicleType::Compactor, 1),
        }];
        let table = ReportTable::from_vehicles(&vehicles);
        assert_eq!(table.columns()[0], KEY_COLUMN);
        assert_eq!(table.rows()[0][0], "42");

        let table = table.without_key();
        assert_eq!(table.columns().len(), 8);
        assert_eq!(table.columns()[0], "VEH_ID");
        assert_eq!(table.rows()[0][0], "C1");
        assert_eq!(table.rows()[0][5], "2020");
    }

    #[test]
    fn test_render_empty_report() {
        let pdf = pdf_text(&render(&ReportTable::default(), "Compactor", &options()));

        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("(Total Vehicles: 0) Tj"));
        assert!(pdf.contains("(No vehicles found for this report.) Tj"));
        assert!(!pdf.contains("(SR.) Tj"));
        assert!(pdf.contains("(Page 1 of 1) Tj"));
        assert!(pdf.contains("(Vehicle Management System | Test Org) Tj"));
    }

    #[test]
    fn test_render_ignores_key_column() {
        let vehicles = vec![StoredVehicle {
            key: 987654,
            record: VehicleRecord::placeholder(VehicleType::MiniTipper, 1),
        }];
        let pdf = pdf_text(&render(
            &ReportTable::from_vehicles(&vehicles),
            "Mini Tipper",
            &options(),
        ));

        assert!(pdf.contains("(MT1) Tj"));
        assert!(pdf.contains("(SR.) Tj"));
        assert!(!pdf.contains("p_key"));
        assert!(!pdf.contains("987654"));
    }

    #[test]
    fn test_multi_page_footer_labels() {
        let pdf = pdf_text(&render(&sample_table(120), "Compactor", &options()));

        let pages = pdf.matches("/Type /Page ").count();
        assert!(pages > 1);
        for page in 1..=pages {
            assert!(pdf.contains(&format!("(Page {page} of {pages}) Tj")));
        }
        assert!(!pdf.contains(&format!("(Page {} of", pages + 1)));
    }

    #[test]
    fn test_report_file_name() {
        let at = options().generated_at;
        assert_eq!(
            report_file_name(ReportKind::VehicleType, at),
            "vehicle_type_report_20240305_140709.pdf"
        );
        assert_eq!(report_file_name(ReportKind::Usage, at), "usage_report_20240305_140709.pdf");
    }

    #[test]
    fn test_write_report_creates_directory() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("reports/nested");

        let path = write_report(
            &dir,
            ReportKind::Usage,
            &sample_table(3),
            "Bulk Waste Collection",
            &options(),
        )
        .unwrap();

        assert_eq!(path, dir.join("usage_report_20240305_140709.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(pdf_text(&bytes).contains("(Total Vehicles: 3) Tj"));
    }

    #[test]
    fn test_logo_embedded_when_loaded() {
        let tmp = tempdir().unwrap();
        let logo_path = tmp.path().join("logo.png");
        std::fs::write(&logo_path, logo::tests::rgb_png()).unwrap();

        let opts = options().with_logo(Logo::load(&logo_path));
        let pdf = pdf_text(&render(&sample_table(1), "Compactor", &opts));
        assert!(pdf.contains("/Subtype /Image"));
        assert!(pdf.contains("/Im1 Do"));
    }
}
