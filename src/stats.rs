//! Per-column summary statistics for plain numeric CSV files.

use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::error::{PhotometryError, Result};

/// Summary of one CSV column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation, `sqrt(mean((x - mean)²))`.
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn compute(column: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(PhotometryError::format(format!("column '{column}' has no values")));
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Ok(ColumnStats {
            column: column.to_string(),
            mean,
            std: variance.sqrt(),
            variance,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Read a CSV with a header row; every cell must be numeric.
pub fn read_columns(path: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    if !path.exists() {
        return Err(PhotometryError::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(PhotometryError::csv("opening CSV"))?;

    let mut columns: Vec<(String, Vec<f64>)> = reader
        .headers()
        .map_err(PhotometryError::csv("reading CSV headers"))?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(PhotometryError::csv(format!("reading CSV row {row_no}")))?;
        for ((name, values), cell) in columns.iter_mut().zip(record.iter()) {
            let v = cell.parse::<f64>().map_err(|_| {
                PhotometryError::format(format!("CSV row {row_no}, {name}: '{cell}' is not a number"))
            })?;
            values.push(v);
        }
    }
    Ok(columns)
}

/// `processed-<name>` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data.csv".to_string());
    input.with_file_name(format!("processed-{name}"))
}

/// Compute statistics for every column of `input` and write them to `output`.
pub fn summarize_file(input: &Path, output: &Path) -> Result<Vec<ColumnStats>> {
    let columns = read_columns(input)?;
    let stats = columns
        .iter()
        .map(|(name, values)| ColumnStats::compute(name, values))
        .collect::<Result<Vec<_>>>()?;

    for s in &stats {
        info!("{}: min {} max {}", s.column, s.min, s.max);
    }

    let mut writer = csv::Writer::from_path(output)
        .map_err(PhotometryError::csv(format!("creating {}", output.display())))?;
    for s in &stats {
        writer
            .serialize(s)
            .map_err(PhotometryError::csv(format!("writing {}", output.display())))?;
    }
    writer.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const MOSQUITOS: &str = "\
year,temperature,rainfall,mosquitos
2001,80,157,150
2002,85,252,217
2003,86,154,153
2004,87,159,158
";

    #[test]
    fn std_is_root_of_mean_squared_deviation() {
        let s = ColumnStats::compute("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.variance, 4.0);
        assert_relative_eq!(s.std, 2.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn empty_column_is_an_error() {
        assert!(ColumnStats::compute("x", &[]).is_err());
    }

    #[test]
    fn summarizes_file_and_writes_csv() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("mosquitos.csv");
        std::fs::write(&input, MOSQUITOS).unwrap();
        let output = default_output_path(&input);
        assert_eq!(output, dir.path().join("processed-mosquitos.csv"));

        let stats = summarize_file(&input, &output).unwrap();
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].column, "year");
        assert_relative_eq!(stats[0].mean, 2002.5);
        assert_relative_eq!(stats[0].variance, 1.25);
        assert_eq!(stats[3].max, 217.0);

        let written = std::fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("column,mean,std,variance,min,max"));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn non_numeric_cell_is_format_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.csv");
        std::fs::write(&input, "a,b\n1,two\n").unwrap();
        let err = summarize_file(&input, &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, PhotometryError::DataFormat(ref m) if m.contains("two")));
    }

    #[test]
    fn ragged_row_keeps_csv_error_as_source() {
        use std::error::Error;

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ragged.csv");
        std::fs::write(&input, "a,b\n1,2\n3\n").unwrap();
        let err = read_columns(&input).unwrap_err();
        assert!(matches!(err, PhotometryError::Csv { ref context, .. } if context.contains("row 1")));
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_input_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_columns(&dir.path().join("absent.csv")),
            Err(PhotometryError::NotFound(_))
        ));
    }
}
