//! Bulk import of vehicle spreadsheets
//!
//! Files are read into a [`Dataset`] whose rows are ordered `(column, value)`
//! pairs, checked for the required header set, converted to
//! [`VehicleRecord`]s and written in a single transaction. Nothing is written
//! when any step fails.

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use miette::Diagnostic;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::{StoreError, VehicleStore};
use crate::entities::vehicle::{VehicleColumn, VehicleRecord};

/// One imported row: cells in file column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRow {
    cells: Vec<(String, String)>,
}

impl DataRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Value of the named column, if the row has it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }
}

/// Tabular data whose columns are only known at runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl Dataset {
    /// Build a dataset from a header and raw rows; short rows are padded
    /// with empty cells, surplus cells are dropped
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| {
                let mut values = values.into_iter();
                DataRow::new(
                    columns
                        .iter()
                        .map(|name| (name.clone(), values.next().unwrap_or_default()))
                        .collect(),
                )
            })
            .collect();
        Self { columns, rows }
    }

    /// Read a CSV or spreadsheet file, chosen by extension
    pub fn read(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::read_csv(path),
            "xlsx" | "xlsm" | "xls" | "ods" => Self::read_spreadsheet(path),
            _ => Err(ImportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Read a CSV file with a header row
    pub fn read_csv(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Parse CSV data with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ImportError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::from_rows(columns, rows))
    }

    /// Read the first sheet of a workbook; its first row is the header
    pub fn read_spreadsheet(path: &Path) -> Result<Self, ImportError> {
        let spreadsheet_error = |message: String| ImportError::Spreadsheet {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook =
            open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?
            .map_err(|e| spreadsheet_error(e.to_string()))?;

        let mut sheet_rows = range.rows();
        let columns: Vec<String> = match sheet_rows.next() {
            Some(header) => header.iter().map(|c| cell_text(c).trim().to_string()).collect(),
            None => Vec::new(),
        };
        let rows = sheet_rows
            .map(|row| row.iter().map(|c| cell_text(c).trim().to_string()).collect())
            .collect();

        Ok(Self::from_rows(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Required columns absent from the header, in canonical order
    pub fn missing_columns(&self) -> Vec<&'static str> {
        VehicleColumn::ALL
            .iter()
            .map(|c| c.name())
            .filter(|name| !self.columns.iter().any(|c| c == name))
            .collect()
    }

    /// Header columns that the store has no place for
    pub fn extra_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| VehicleColumn::from_name(c).is_none())
            .cloned()
            .collect()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// How rows reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Plain insert: a VEH_ID already in the store (or repeated in the file)
    /// aborts the whole import
    #[default]
    Append,
    /// Insert or overwrite by VEH_ID
    Upsert,
}

/// Import options
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Validate and convert, but write nothing
    pub dry_run: bool,
}

/// Rows kept in [`ImportStats::preview`]
pub const PREVIEW_ROWS: usize = 5;

/// Import statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub ignored_columns: Vec<String>,
    /// First converted rows of the file, in file order
    pub preview: Vec<VehicleRecord>,
}

/// Errors that abort an import
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("missing required columns in the uploaded file: {}", .missing.join(", "))]
    #[diagnostic(
        code(fleet::import::missing_columns),
        help("the header must contain VEH_ID, REG_NO, VEHICLE_TYPE, MAKE, MODEL, YEAR, OWNER, USED_FOR (exact names); see 'fleet import --template'")
    )]
    MissingColumns { missing: Vec<String> },

    #[error("unsupported file type: {path:?}")]
    #[diagnostic(code(fleet::import::format), help("use a .csv or .xlsx file"))]
    UnsupportedFormat { path: PathBuf },

    #[error("cannot read {path:?}: {source}")]
    #[diagnostic(code(fleet::import::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    #[diagnostic(code(fleet::import::csv))]
    Csv(#[from] csv::Error),

    #[error("cannot read spreadsheet {path:?}: {message}")]
    #[diagnostic(code(fleet::import::spreadsheet))]
    Spreadsheet { path: PathBuf, message: String },

    #[error("row {row}: YEAR '{value}' is not a whole number")]
    #[diagnostic(code(fleet::import::year))]
    InvalidYear { row: usize, value: String },

    #[error("row {row} (VEH_ID '{veh_id}') was rejected by the store: {source}")]
    #[diagnostic(
        code(fleet::import::rejected),
        help("VEH_ID must be unique; use --upsert to overwrite existing vehicles")
    )]
    Rejected {
        row: usize,
        veh_id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// File row number of a dataset row (1-based, after the header)
fn file_row(index: usize) -> usize {
    index + 2
}

/// Parse a YEAR cell: blank is NULL, `2019` and `2019.0` are 2019
fn parse_year(value: &str, row: usize) -> Result<Option<i64>, ImportError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(year) = value.parse::<i64>() {
        return Ok(Some(year));
    }
    match value.parse::<f64>() {
        Ok(year) if year.fract() == 0.0 && year.is_finite() => Ok(Some(year as i64)),
        _ => Err(ImportError::InvalidYear {
            row,
            value: value.to_string(),
        }),
    }
}

/// Convert dataset rows into records, checking only the header and YEAR type
pub fn to_records(dataset: &Dataset) -> Result<Vec<VehicleRecord>, ImportError> {
    let missing = dataset.missing_columns();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cell = |column: VehicleColumn| {
                row.get(column.name()).unwrap_or_default().to_string()
            };
            Ok(VehicleRecord {
                veh_id: cell(VehicleColumn::VehId),
                reg_no: cell(VehicleColumn::RegNo),
                vehicle_type: cell(VehicleColumn::VehicleType),
                make: cell(VehicleColumn::Make),
                model: cell(VehicleColumn::Model),
                year: parse_year(&cell(VehicleColumn::Year), file_row(idx))?,
                owner: cell(VehicleColumn::Owner),
                used_for: cell(VehicleColumn::UsedFor),
            })
        })
        .collect()
}

/// Validate a dataset and append its rows to the store
///
/// Fails fast before writing when a required column is missing. Rows are not
/// checked against the vehicle type or usage tables.
pub fn import_dataset(
    store: &mut VehicleStore,
    dataset: &Dataset,
    options: &ImportOptions,
) -> Result<ImportStats, ImportError> {
    let records = to_records(dataset)?;

    let ignored_columns = dataset.extra_columns();
    if !ignored_columns.is_empty() {
        tracing::warn!(
            columns = ?ignored_columns,
            "ignoring columns not present in the vehicle table"
        );
    }

    let mut stats = ImportStats {
        rows_read: records.len(),
        rows_written: 0,
        ignored_columns,
        preview: records.iter().take(PREVIEW_ROWS).cloned().collect(),
    };

    if options.dry_run {
        tracing::info!(rows = stats.rows_read, "import dry run complete");
        return Ok(stats);
    }

    let tx = store.begin()?;
    for (idx, record) in records.iter().enumerate() {
        let written = match options.mode {
            ImportMode::Append => tx.insert(record),
            ImportMode::Upsert => tx.upsert(record),
        };
        written.map_err(|source| ImportError::Rejected {
            row: file_row(idx),
            veh_id: record.veh_id.clone(),
            source,
        })?;
        stats.rows_written += 1;
    }
    tx.commit()?;

    tracing::info!(rows = stats.rows_written, mode = ?options.mode, "import committed");
    Ok(stats)
}

/// Read a file and import it
pub fn import_file(
    store: &mut VehicleStore,
    path: &Path,
    options: &ImportOptions,
) -> Result<ImportStats, ImportError> {
    let dataset = Dataset::read(path)?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "read import file");
    import_dataset(store, &dataset, options)
}

/// Header line and example row for a new import spreadsheet
pub fn template_rows() -> (Vec<&'static str>, Vec<&'static str>) {
    let headers = VehicleColumn::ALL.iter().map(|c| c.name()).collect();
    let example = vec![
        "C1",
        "FSD-1234",
        "Compactor",
        "Hino",
        "500 Series",
        "2019",
        "Municipal Corporation",
        "Container Base Collection",
    ];
    (headers, example)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "VEH_ID,REG_NO,VEHICLE_TYPE,MAKE,MODEL,YEAR,OWNER,USED_FOR";

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_read_csv_rows_as_ordered_pairs() {
        let data = dataset(&format!(
            "{HEADER}\nC1,FSD-1,Compactor,Hino,500,2019,Town A,Container Base Collection\n"
        ));
        assert_eq!(data.len(), 1);
        let row = &data.rows()[0];
        assert_eq!(row.cells()[0], ("VEH_ID".to_string(), "C1".to_string()));
        assert_eq!(row.get("OWNER"), Some("Town A"));
        assert!(data.missing_columns().is_empty());
    }

    #[test]
    fn test_missing_column_rejected_and_nothing_written() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        store
            .upsert(&VehicleRecord::placeholder(
                crate::entities::vehicle::VehicleType::Compactor,
                1,
            ))
            .unwrap();

        let data = dataset(
            "VEH_ID,REG_NO,VEHICLE_TYPE,MAKE,MODEL,YEAR,OWNER\nC9,R,Compactor,M,M,2019,O\n",
        );
        let err = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap_err();

        match err {
            ImportError::MissingColumns { missing } => assert_eq!(missing, vec!["USED_FOR"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_header_names_are_exact() {
        let data = dataset("veh_id,REG_NO,VEHICLE_TYPE,MAKE,MODEL,YEAR,OWNER,USED_FOR\n");
        assert_eq!(data.missing_columns(), vec!["VEH_ID"]);
    }

    #[test]
    fn test_rows_written_as_is() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!(
            "{HEADER}\nX1,R1,Hand Cart,Local,Mk1,1850,Ward 3,Street Festival\nX2,R2,Compactor,Hino,500,,Ward 4,\n"
        ));

        let stats = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap();
        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.rows_written, 2);

        let x1 = store.get("X1").unwrap().unwrap().record;
        assert_eq!(x1.vehicle_type, "Hand Cart");
        assert_eq!(x1.year, Some(1850));
        assert_eq!(x1.used_for, "Street Festival");

        let x2 = store.get("X2").unwrap().unwrap().record;
        assert_eq!(x2.year, None);
        assert_eq!(x2.used_for, "");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!(
            "p_key,{HEADER},NOTES\n7,C1,R,Compactor,M,M,2019,O,Container Base Collection,spare\n"
        ));

        let stats = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap();
        assert_eq!(stats.ignored_columns, vec!["p_key", "NOTES"]);
        assert_eq!(store.get("C1").unwrap().unwrap().record.owner, "O");
    }

    #[test]
    fn test_append_duplicate_aborts_whole_import() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!(
            "{HEADER}\nC1,R1,Compactor,M,M,2019,A,\nC2,R2,Compactor,M,M,2019,B,\nC1,R3,Compactor,M,M,2019,C,\n"
        ));

        let err = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap_err();
        match err {
            ImportError::Rejected { row, veh_id, .. } => {
                assert_eq!(row, 4);
                assert_eq!(veh_id, "C1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_rows_without_veh_id_do_not_collide() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!(
            "{HEADER}\nC1,R1,Compactor,M,M,2019,A,\n,R2,Compactor,M,M,2019,B,\n,R3,,,,,C,\n,,,,,,,\n"
        ));

        let stats = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap();
        assert_eq!(stats.rows_written, 4);
        assert_eq!(store.count().unwrap(), 4);

        let blank_ids = store
            .all()
            .unwrap()
            .into_iter()
            .filter(|v| v.record.veh_id.is_empty())
            .count();
        assert_eq!(blank_ids, 3);
        assert!(store.get("C1").unwrap().is_some());
    }

    #[test]
    fn test_upsert_mode_overwrites() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!(
            "{HEADER}\nC1,R1,Compactor,M,M,2019,A,\nC1,R1,Compactor,M,M,2019,B,\n"
        ));
        let options = ImportOptions {
            mode: ImportMode::Upsert,
            dry_run: false,
        };

        let stats = import_dataset(&mut store, &data, &options).unwrap();
        assert_eq!(stats.rows_written, 2);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("C1").unwrap().unwrap().record.owner, "B");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let data = dataset(&format!("{HEADER}\nC1,R1,Compactor,M,M,2019,A,\n"));
        let options = ImportOptions {
            mode: ImportMode::Append,
            dry_run: true,
        };

        let stats = import_dataset(&mut store, &data, &options).unwrap();
        assert_eq!(stats.rows_read, 1);
        assert_eq!(stats.rows_written, 0);
        assert_eq!(stats.preview[0].owner, "A");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_preview_keeps_first_rows() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let body: String = (1..=8)
            .map(|n| format!("C{n},R{n},Compactor,M,M,2019,A,\n"))
            .collect();
        let data = dataset(&format!("{HEADER}\n{body}"));

        let stats = import_dataset(&mut store, &data, &ImportOptions::default()).unwrap();
        let ids: Vec<_> = stats.preview.iter().map(|r| r.veh_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2", "C3", "C4", "C5"]);
        assert_eq!(stats.rows_written, 8);
    }

    #[test]
    fn test_invalid_year_names_row() {
        let data = dataset(&format!(
            "{HEADER}\nC1,R1,Compactor,M,M,2019,A,\nC2,R2,Compactor,M,M,soon,B,\n"
        ));
        let err = to_records(&data).unwrap_err();
        assert!(matches!(err, ImportError::InvalidYear { row: 3, .. }));
    }

    #[test]
    fn test_parse_year_accepts_spreadsheet_floats() {
        assert_eq!(parse_year("2019.0", 2).unwrap(), Some(2019));
        assert_eq!(parse_year(" 2020 ", 2).unwrap(), Some(2020));
        assert_eq!(parse_year("", 2).unwrap(), None);
        assert!(parse_year("2019.5", 2).is_err());
    }

    #[test]
    fn test_short_rows_padded() {
        let data = dataset(&format!("{HEADER}\nC1,R1\n"));
        let records = to_records(&data).unwrap();
        assert_eq!(records[0].veh_id, "C1");
        assert_eq!(records[0].owner, "");
    }

    #[test]
    fn test_read_dispatches_on_extension() {
        let tmp = tempdir().unwrap();
        let csv_path = tmp.path().join("fleet.CSV");
        std::fs::write(&csv_path, format!("{HEADER}\nC1,R1,Compactor,M,M,2019,A,\n")).unwrap();
        assert_eq!(Dataset::read(&csv_path).unwrap().len(), 1);

        let txt_path = tmp.path().join("fleet.txt");
        std::fs::write(&txt_path, HEADER).unwrap();
        assert!(matches!(
            Dataset::read(&txt_path),
            Err(ImportError::UnsupportedFormat { .. })
        ));
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn test_read_spreadsheet_first_sheet() {
        let data = Dataset::read(&fixture("vehicles.xlsx")).unwrap();

        assert_eq!(&data.columns()[..8], HEADER.split(',').collect::<Vec<_>>().as_slice());
        assert_eq!(data.extra_columns(), vec!["NOTES"]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.rows()[0].get("REG_NO"), Some("FSD-1"));
        assert_eq!(data.rows()[1].get("YEAR"), Some(""));
        assert_eq!(data.rows()[2].get("USED_FOR"), Some(""));
    }

    #[test]
    fn test_spreadsheet_numbers_become_records() {
        let data = Dataset::read(&fixture("vehicles.xlsx")).unwrap();
        let records = to_records(&data).unwrap();

        assert_eq!(records[0].veh_id, "C1");
        assert_eq!(records[0].year, Some(2019));
        assert_eq!(records[1].year, None);
        assert_eq!(records[2].model, "300");
        assert_eq!(records[2].year, Some(2021));
    }

    #[test]
    fn test_template_matches_required_columns() {
        let (headers, example) = template_rows();
        assert_eq!(headers.join(","), HEADER);
        assert_eq!(headers.len(), example.len());
    }
}
