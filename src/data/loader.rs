use std::path::Path;

use crate::data::parser;
use crate::error::{AnalysisError, Result};
use crate::state::dataset::Dataset;

/// Raw table contents, column-major, header row (if any) still in place.
pub struct LoadedData {
    pub columns: Vec<Vec<String>>, // columns[col_idx][row_idx]
    pub row_count: usize,
}

impl LoadedData {
    pub fn into_dataset(self) -> Result<Dataset> {
        Dataset::from_columns(&self.columns)
    }
}

/// Load a CSV or Excel file and return its raw string cells.
pub fn load_file(path: &Path) -> Result<LoadedData> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" => read_csv_rows(path)?,
        "xls" | "xlsx" => read_excel_rows(path)?,
        _ => return Err(AnalysisError::Load(format!("Unsupported file format: .{ext}"))),
    };

    let loaded = rows_to_columns(parser::strip_preamble(rows))?;
    tracing::info!(
        path = %path.display(),
        columns = loaded.columns.len(),
        rows = loaded.row_count,
        "loaded table"
    );
    Ok(loaded)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read(path).map_err(|e| AnalysisError::Load(format!("Cannot read file: {e}")))?;
    // Fall back to latin1 when the file is not valid UTF-8.
    let text = String::from_utf8(content.clone())
        .unwrap_or_else(|_| content.iter().map(|&b| b as char).collect());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AnalysisError::Load(format!("Malformed CSV record {line}: {e}")))?;
        let row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
        if row.iter().any(|cell| !cell.is_empty()) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_excel_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| AnalysisError::Load(format!("Cannot open Excel file: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::Load("No sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AnalysisError::Load(format!("Cannot read sheet: {e}")))?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.trim().to_string(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect::<Vec<String>>()
        })
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();
    Ok(rows)
}

/// Transpose to column-major. Every row must have the header's width.
pub(crate) fn rows_to_columns(rows: Vec<Vec<String>>) -> Result<LoadedData> {
    let Some(width) = rows.first().map(|r| r.len()) else {
        return Err(AnalysisError::Load("No data found in file".to_string()));
    };

    let mut columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); width];
    let row_count = rows.len();

    for (row_idx, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(AnalysisError::Load(format!(
                "Row {row_idx} has {} fields, expected {width}",
                row.len()
            )));
        }
        for (col_data, cell) in columns.iter_mut().zip(row) {
            col_data.push(cell);
        }
    }

    Ok(LoadedData { columns, row_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_load_csv_with_preamble() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_temp(&dir, "run.csv", b"exported by logger\ntime,Signal_1\n0,1.5\n1,2.5\n\n2,3.5\n");
        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.columns.len(), 2);
        assert_eq!(loaded.row_count, 4);
        assert_eq!(loaded.columns[1][0], "Signal_1");

        let dataset = loaded.into_dataset().unwrap();
        assert_eq!(dataset.time_step, 1.0);
        assert_eq!(dataset.series[1].label(), Some("Signal_1"));
        assert_eq!(dataset.series[1].original(), &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_latin1_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_temp(&dir, "temp.csv", b"t,Temp \xb0C\n0,20\n1,21\n");
        let dataset = load_file(&path).unwrap().into_dataset().unwrap();
        assert_eq!(dataset.series[1].label(), Some("Temp \u{00b0}C"));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_temp(&dir, "bad.csv", b"t,v\n0,1\n1\n");
        assert!(matches!(load_file(&path), Err(AnalysisError::Load(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("data.parquet")).err().unwrap();
        assert_eq!(err, AnalysisError::Load("Unsupported file format: .parquet".to_string()));
    }
}
