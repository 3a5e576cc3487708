//! Loading of the two flight extracts.
//!
//! A loaded [`FlightTable`] keeps only what the audit needs: the row count,
//! the total number of null cells across every column, and the route key of
//! each row. Other columns are read for null counting and then dropped.

use crate::error::{AuditError, Result, ResultExt};
use crate::types::{DEST_COLUMN, ORIGIN_COLUMN, RouteKey, TableKind};
use crate::utils::{is_key_compatible_dtype, null_values};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// One extract, reduced to the facts the audit inspects.
#[derive(Debug, Clone)]
pub struct FlightTable {
    pub kind: TableKind,
    /// Number of records, including those with a null key cell.
    pub rows: usize,
    /// Null cells summed over all columns and rows.
    pub null_cells: usize,
    /// Route key of every record with both key cells present, in file order.
    pub keys: Vec<RouteKey>,
    /// Records skipped by key-based operations because a key cell was null.
    pub null_key_rows: usize,
    /// Distinct non-null origin ids, including rows whose destination is null.
    pub distinct_origins: usize,
    /// Distinct non-null destination ids, including rows whose origin is null.
    pub distinct_dests: usize,
}

impl FlightTable {
    /// Build a table straight from route keys, with no null cells.
    pub fn from_keys(kind: TableKind, keys: Vec<RouteKey>) -> Self {
        Self {
            kind,
            rows: keys.len(),
            null_cells: 0,
            distinct_origins: distinct_ids(keys.iter().map(|k| Some(k.origin))),
            distinct_dests: distinct_ids(keys.iter().map(|k| Some(k.dest))),
            keys,
            null_key_rows: 0,
        }
    }

    /// Extract route keys and null statistics from a loaded DataFrame.
    ///
    /// Fails when either key column is missing or holds values that are not
    /// integer airport ids.
    pub fn from_dataframe(kind: TableKind, df: &DataFrame) -> Result<Self> {
        let origins = key_column(kind, df, ORIGIN_COLUMN)?;
        let dests = key_column(kind, df, DEST_COLUMN)?;

        let null_cells: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
        let distinct_origins = distinct_ids(origins.iter().copied());
        let distinct_dests = distinct_ids(dests.iter().copied());

        let mut keys = Vec::with_capacity(df.height());
        let mut null_key_rows = 0;
        for (origin, dest) in origins.into_iter().zip(dests) {
            match (origin, dest) {
                (Some(origin), Some(dest)) => keys.push(RouteKey::new(origin, dest)),
                _ => null_key_rows += 1,
            }
        }

        if null_key_rows > 0 {
            warn!(
                "{} table: {} rows have a null route key and are excluded from route comparisons",
                kind, null_key_rows
            );
        }

        Ok(Self {
            kind,
            rows: df.height(),
            null_cells,
            keys,
            null_key_rows,
            distinct_origins,
            distinct_dests,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

fn distinct_ids(ids: impl Iterator<Item = Option<i64>>) -> usize {
    ids.flatten().collect::<HashSet<_>>().len()
}

/// Read one key column as nullable integers.
///
/// Float columns are accepted only when every value is integral; a
/// fractional id would otherwise be truncated onto another airport.
fn key_column(kind: TableKind, df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name).map_err(|_| AuditError::ColumnNotFound {
        table: kind.to_string(),
        column: name.to_string(),
    })?;

    let series = column.as_materialized_series();
    if !is_key_compatible_dtype(series.dtype()) {
        return Err(AuditError::InvalidKeyColumn {
            table: kind.to_string(),
            column: name.to_string(),
            reason: format!("unsupported type {}", series.dtype()),
        });
    }

    if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        let values = series.cast(&DataType::Float64)?;
        if let Some(bad) = values.f64()?.into_iter().flatten().find(|v| v.fract() != 0.0) {
            return Err(AuditError::InvalidKeyColumn {
                table: kind.to_string(),
                column: name.to_string(),
                reason: format!("fractional value {}", bad),
            });
        }
    }

    let ids = series
        .strict_cast(&DataType::Int64)
        .map_err(|e| AuditError::InvalidKeyColumn {
            table: kind.to_string(),
            column: name.to_string(),
            reason: e.to_string(),
        })?;

    Ok(ids.i64()?.into_iter().collect())
}

/// Load one extract from disk.
///
/// Missing files fail with [`AuditError::InputNotFound`] before any parsing.
pub fn load_table(kind: TableKind, path: &Path, infer_schema_length: usize) -> Result<FlightTable> {
    if !path.is_file() {
        return Err(AuditError::InputNotFound {
            table: kind.to_string(),
            path: path.to_path_buf(),
        });
    }

    info!("Loading {} table from: {}", kind, path.display());
    let df = read_csv_with_fallback(path, infer_schema_length)
        .context(format!("Reading {} table {}", kind, path.display()))?;
    info!("{} table loaded: {:?}", kind, df.shape());

    FlightTable::from_dataframe(kind, &df)
}

/// Read a CSV, first with a bounded schema inference window and then, if
/// that fails (typically a column that turns textual past the window), with
/// inference over the whole file.
fn read_csv_with_fallback(path: &Path, infer_schema_length: usize) -> PolarsResult<DataFrame> {
    match read_csv(path, Some(infer_schema_length)) {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!(
                "Loading with a {}-row inference window failed: {}",
                infer_schema_length, e
            );
            read_csv(path, None)
        }
    }
}

fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values())),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_from_dataframe_extracts_keys_in_order() {
        let df = df!(
            "ORIGIN_AIRPORT_ID" => &[1i64, 3, 1],
            "DEST_AIRPORT_ID" => &[2i64, 4, 2],
            "CARRIER" => &["AA", "DL", "UA"]
        )
        .unwrap();

        let table = FlightTable::from_dataframe(TableKind::Reporting, &df).unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(table.null_cells, 0);
        assert_eq!(
            table.keys,
            vec![RouteKey::new(1, 2), RouteKey::new(3, 4), RouteKey::new(1, 2)]
        );
    }

    #[test]
    fn test_from_dataframe_counts_nulls_and_skips_null_keys() {
        let df = df!(
            "ORIGIN_AIRPORT_ID" => &[Some(1i64), None, Some(5)],
            "DEST_AIRPORT_ID" => &[Some(2i64), Some(4), Some(6)],
            "DEP_DELAY" => &[None, Some(3.0f64), None]
        )
        .unwrap();

        let table = FlightTable::from_dataframe(TableKind::Marketing, &df).unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(table.null_cells, 3);
        assert_eq!(table.null_key_rows, 1);
        assert_eq!(table.keys, vec![RouteKey::new(1, 2), RouteKey::new(5, 6)]);
    }

    #[test]
    fn test_missing_key_column() {
        let df = df!("ORIGIN_AIRPORT_ID" => &[1i64, 2]).unwrap();

        let err = FlightTable::from_dataframe(TableKind::Reporting, &df).unwrap_err();
        assert!(matches!(
            err,
            AuditError::ColumnNotFound { ref column, .. } if column == "DEST_AIRPORT_ID"
        ));
    }

    #[test]
    fn test_non_integer_key_column() {
        let df = df!(
            "ORIGIN_AIRPORT_ID" => &["ATL", "JFK"],
            "DEST_AIRPORT_ID" => &[1i64, 2]
        )
        .unwrap();

        let err = FlightTable::from_dataframe(TableKind::Reporting, &df).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_KEY_COLUMN");
    }

    #[test]
    fn test_fractional_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "rep.csv", "ORIGIN_AIRPORT_ID,DEST_AIRPORT_ID\n1.5,2\n1,2\n");

        let err = load_table(TableKind::Reporting, &path, 100).unwrap_err();
        assert!(matches!(
            err,
            AuditError::InvalidKeyColumn { ref column, .. } if column == "ORIGIN_AIRPORT_ID"
        ));
    }

    #[test]
    fn test_integral_float_keys_are_accepted() {
        let df = df!(
            "ORIGIN_AIRPORT_ID" => &[Some(1.0f64), None],
            "DEST_AIRPORT_ID" => &[2.0f64, 4.0]
        )
        .unwrap();

        let table = FlightTable::from_dataframe(TableKind::Reporting, &df).unwrap();
        assert_eq!(table.keys, vec![RouteKey::new(1, 2)]);
    }

    #[test]
    fn test_distinct_airports_include_half_null_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "rep.csv", "ORIGIN_AIRPORT_ID,DEST_AIRPORT_ID\n1,2\n5,\n");

        let table = load_table(TableKind::Reporting, &path, 100).unwrap();
        assert_eq!(table.keys, vec![RouteKey::new(1, 2)]);
        assert_eq!(table.distinct_origins, 2);
        assert_eq!(table.distinct_dests, 1);
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(TableKind::Marketing, &dir.path().join("nope.csv"), 100).unwrap_err();
        assert!(matches!(err, AuditError::InputNotFound { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_table_reads_null_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "rep.csv",
            "ORIGIN_AIRPORT_ID,DEST_AIRPORT_ID,TAIL_NUM\n1,2,N123\n3,4,NA\n1,2,\n",
        );

        let table = load_table(TableKind::Reporting, &path, 100).unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(table.null_cells, 2);
        assert_eq!(table.keys.len(), 3);
    }

    #[test]
    fn test_load_table_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "mkt.csv", "ORIGIN_AIRPORT_ID,DEST_AIRPORT_ID\n");

        let table = load_table(TableKind::Marketing, &path, 100).unwrap();
        assert!(table.is_empty());
        assert!(table.keys.is_empty());
    }
}
