use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{PhotometryError, Result};

use super::instrument::Instrument;
use super::model::{CmdData, PhotometryTable, YFilter};

/// Header keyword naming the camera.
const CAMERA_KEY: &str = "CAMERA";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a photometry table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – columnar table, camera in the key-value metadata
/// * `.csv`     – header row, camera in a leading `# CAMERA = ACS` card
/// * `.json`    – `{ "header": { "CAMERA": "ACS" }, "rows": [ {...}, ... ] }`
///
/// `camera` overrides whatever the file header says.
pub fn load_file(path: &Path, camera: Option<Instrument>) -> Result<PhotometryTable> {
    if !path.exists() {
        return Err(PhotometryError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, camera),
        "csv" => load_csv(path, camera),
        "json" => load_json(path, camera),
        other => Err(PhotometryError::format(format!(
            "unsupported file extension: .{other}"
        ))),
    }?;

    info!(
        "loaded {} stars from {} (camera {})",
        table.len(),
        path.display(),
        table.instrument
    );
    Ok(table)
}

/// Load a file and derive color / magnitude with `which` on the y-axis.
pub fn load_cmd(path: &Path, which: YFilter, camera: Option<Instrument>) -> Result<CmdData> {
    let table = load_file(path, camera)?;
    debug!("y-axis magnitude column: {which}");
    Ok(table.to_cmd(which))
}

/// Pick the instrument: explicit override first, then the header value.
fn resolve_instrument(header: Option<&str>, camera: Option<Instrument>) -> Result<Instrument> {
    match (camera, header) {
        (Some(inst), _) => Ok(inst),
        (None, Some(name)) => name.parse(),
        (None, None) => Err(PhotometryError::format(format!(
            "no {CAMERA_KEY} keyword in header and no camera given"
        ))),
    }
}

/// The four column names for `inst`, in table order.
fn column_names(inst: Instrument) -> [String; 4] {
    [
        inst.mag1_column(),
        inst.mag2_column(),
        Instrument::MAG1_ERR_COLUMN.to_string(),
        Instrument::MAG2_ERR_COLUMN.to_string(),
    ]
}

fn assemble(inst: Instrument, columns: [Vec<f64>; 4]) -> Result<PhotometryTable> {
    let [mag1, mag2, mag1_err, mag2_err] = columns;
    PhotometryTable::new(inst, mag1, mag2, mag1_err, mag2_err)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: optional `# KEY = VALUE` header cards, then a header row with
/// column names, then one numeric row per star.
fn load_csv(path: &Path, camera: Option<Instrument>) -> Result<PhotometryTable> {
    let text = std::fs::read_to_string(path)?;

    let cards = parse_header_cards(&text);
    let inst = resolve_instrument(cards.get(CAMERA_KEY).map(String::as_str), camera)?;
    let names = column_names(inst);

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(PhotometryError::csv("reading CSV headers"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut idx = [0usize; 4];
    for (slot, name) in idx.iter_mut().zip(&names) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PhotometryError::format(format!("CSV missing '{name}' column")))?;
    }

    let mut columns: [Vec<f64>; 4] = Default::default();

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(PhotometryError::csv(format!("reading CSV row {row_no}")))?;
        for ((col, &i), name) in columns.iter_mut().zip(&idx).zip(&names) {
            let cell = record.get(i).unwrap_or("");
            let value = cell.parse::<f64>().map_err(|_| {
                PhotometryError::format(format!("CSV row {row_no}, {name}: '{cell}' is not a number"))
            })?;
            col.push(value);
        }
    }

    assemble(inst, columns)
}

/// Collect FITS-card style `# KEY = VALUE / comment` lines at the top of a file.
fn parse_header_cards(text: &str) -> BTreeMap<String, String> {
    let mut cards = BTreeMap::new();
    for line in text.lines() {
        let Some(card) = line.trim_start().strip_prefix('#') else {
            break;
        };
        let Some((key, value)) = card.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let value = match value.strip_prefix(['\'', '"']) {
            Some(quoted) => quoted.split(['\'', '"']).next().unwrap_or(""),
            None => value.split(" /").next().unwrap_or(""),
        };
        cards.insert(key.trim().to_ascii_uppercase(), value.trim().to_string());
    }
    cards
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonTable {
    #[serde(default)]
    header: BTreeMap<String, JsonValue>,
    rows: Vec<serde_json::Map<String, JsonValue>>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "header": { "CAMERA": "ACS" },
///   "rows": [
///     { "MAG1_ACS": 24.1, "MAG2_ACS": 23.2, "MAG1_ERR": 0.05, "MAG2_ERR": 0.04 },
///     ...
///   ]
/// }
/// ```
fn load_json(path: &Path, camera: Option<Instrument>) -> Result<PhotometryTable> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonTable = serde_json::from_str(&text)
        .map_err(|source| PhotometryError::Json {
            context: "parsing JSON table".to_string(),
            source,
        })?;

    let header_camera = root
        .header
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(CAMERA_KEY))
        .and_then(|(_, v)| v.as_str());
    let inst = resolve_instrument(header_camera, camera)?;
    let names = column_names(inst);

    let mut columns: [Vec<f64>; 4] = Default::default();
    for v in columns.iter_mut() {
        v.reserve(root.rows.len());
    }

    for (i, row) in root.rows.iter().enumerate() {
        for (col, name) in columns.iter_mut().zip(&names) {
            let value = row
                .get(name)
                .ok_or_else(|| PhotometryError::format(format!("row {i}: missing '{name}'")))?
                .as_f64()
                .ok_or_else(|| {
                    PhotometryError::format(format!("row {i}, {name}: not a number"))
                })?;
            col.push(value);
        }
    }

    assemble(inst, columns)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet photometry table.
///
/// Expected schema: numeric `MAG1_<cam>`, `MAG2_<cam>`, `MAG1_ERR`,
/// `MAG2_ERR` columns (Float64, Float32, Int64 or Int32). The camera is read
/// from the file's key-value metadata, falling back to the Arrow schema
/// metadata.
fn load_parquet(path: &Path, camera: Option<Instrument>) -> Result<PhotometryTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(PhotometryError::parquet("reading parquet metadata"))?;

    let kv_camera = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kv| {
            kv.iter()
                .find(|entry| entry.key.eq_ignore_ascii_case(CAMERA_KEY))
                .and_then(|entry| entry.value.clone())
        });
    let header_camera = kv_camera.or_else(|| {
        builder
            .schema()
            .metadata()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(CAMERA_KEY))
            .map(|(_, v)| v.clone())
    });

    let inst = resolve_instrument(header_camera.as_deref(), camera)?;
    let names = column_names(inst);

    let reader = builder
        .build()
        .map_err(PhotometryError::parquet("building parquet reader"))?;

    let mut columns: [Vec<f64>; 4] = Default::default();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|source| PhotometryError::Arrow {
                context: "reading parquet record batch".to_string(),
                source,
            })?;
        let schema = batch.schema();

        for (col, name) in columns.iter_mut().zip(&names) {
            let idx = schema
                .index_of(name)
                .map_err(|_| PhotometryError::format(format!("parquet file missing '{name}' column")))?;
            extend_f64(col, batch.column(idx), name)?;
        }
    }

    assemble(inst, columns)
}

// -- Arrow helpers --

/// Append a numeric Arrow column to `out` as `f64`. Nulls are rejected.
fn extend_f64(out: &mut Vec<f64>, col: &Arc<dyn Array>, name: &str) -> Result<()> {
    if col.null_count() > 0 {
        return Err(PhotometryError::format(format!(
            "column '{name}' contains {} null values",
            col.null_count()
        )));
    }

    match col.data_type() {
        DataType::Float64 => {
            let arr = downcast::<Float64Array>(col, name)?;
            out.extend(arr.values().iter().copied());
        }
        DataType::Float32 => {
            let arr = downcast::<Float32Array>(col, name)?;
            out.extend(arr.values().iter().map(|&v| v as f64));
        }
        DataType::Int64 => {
            let arr = downcast::<Int64Array>(col, name)?;
            out.extend(arr.values().iter().map(|&v| v as f64));
        }
        DataType::Int32 => {
            let arr = downcast::<Int32Array>(col, name)?;
            out.extend(arr.values().iter().map(|&v| v as f64));
        }
        other => {
            return Err(PhotometryError::format(format!(
                "column '{name}' has type {other:?}, expected a numeric type"
            )))
        }
    }
    Ok(())
}

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>, name: &str) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PhotometryError::format(format!("column '{name}': unexpected array layout")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use parquet::file::metadata::KeyValue;
    use parquet::file::properties::WriterProperties;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const VI_CSV: &str = "\
# CAMERA = 'ACS' / instrument
MAG1_ACS,MAG2_ACS,MAG1_ERR,MAG2_ERR
24.0,23.0,0.03,0.04
25.5,24.0,0.06,0.08
99.0,22.0,9.99,0.02
";

    #[test]
    fn csv_roundtrip_with_second_filter_on_y() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "phot.csv", VI_CSV);

        let cmd = load_cmd(&path, YFilter::Second, None).unwrap();
        assert_eq!(cmd.mag, vec![23.0, 24.0, 22.0]);
        assert_eq!(cmd.mag_err, vec![0.04, 0.08, 0.02]);
        assert_eq!(cmd.color, vec![1.0, 1.5, 77.0]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("nope.csv"), None).unwrap_err();
        assert!(matches!(err, PhotometryError::NotFound(_)));
    }

    #[test]
    fn missing_column_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.csv",
            "# CAMERA = ACS\nMAG1_ACS,MAG1_ERR,MAG2_ERR\n1,0.1,0.1\n",
        );
        let err = load_file(&path, None).unwrap_err();
        assert!(matches!(err, PhotometryError::DataFormat(ref m) if m.contains("MAG2_ACS")));
    }

    #[test]
    fn unknown_camera_in_header() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cam.csv", "# CAMERA = MIRI\nMAG1_MIRI\n1\n");
        let err = load_file(&path, None).unwrap_err();
        assert!(matches!(err, PhotometryError::UnknownInstrument(ref n) if n == "MIRI"));
    }

    #[test]
    fn camera_override_replaces_header() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "wfpc2.csv",
            "MAG1_WFPC2,MAG2_WFPC2,MAG1_ERR,MAG2_ERR\n20,19,0.1,0.1\n",
        );
        assert!(load_file(&path, None).is_err());
        let table = load_file(&path, Some(Instrument::Wfpc2)).unwrap();
        assert_eq!(table.instrument, Instrument::Wfpc2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn json_table() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "phot.json",
            r#"{
                "header": {"camera": "UVIS"},
                "rows": [
                    {"MAG1_UVIS": 22.0, "MAG2_UVIS": 21.0, "MAG1_ERR": 0.1, "MAG2_ERR": 0.2},
                    {"MAG1_UVIS": 23, "MAG2_UVIS": 21.5, "MAG1_ERR": 0.3, "MAG2_ERR": 0.4}
                ]
            }"#,
        );
        let table = load_file(&path, None).unwrap();
        assert_eq!(table.instrument, Instrument::Wfc3Uvis);
        assert_eq!(table.mag1, vec![22.0, 23.0]);
        assert_eq!(table.mag2_err, vec![0.2, 0.4]);
    }

    #[test]
    fn json_non_numeric_cell() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.json",
            r#"{"header": {"CAMERA": "IR"}, "rows": [
                {"MAG1_IR": "x", "MAG2_IR": 1, "MAG1_ERR": 0, "MAG2_ERR": 0}
            ]}"#,
        );
        assert!(matches!(
            load_file(&path, None),
            Err(PhotometryError::DataFormat(_))
        ));
    }

    #[test]
    fn parquet_table_with_kv_camera() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phot.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("MAG1_ACS", DataType::Float32, false),
            Field::new("MAG2_ACS", DataType::Float64, false),
            Field::new("MAG1_ERR", DataType::Float64, false),
            Field::new("MAG2_ERR", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float32Array::from(vec![24.0f32, 25.5])),
                Arc::new(Float64Array::from(vec![23.0, 24.0])),
                Arc::new(Float64Array::from(vec![0.03, 0.06])),
                Arc::new(Float64Array::from(vec![0.04, 0.08])),
            ],
        )
        .unwrap();

        let props = WriterProperties::builder()
            .set_key_value_metadata(Some(vec![KeyValue::new(
                "CAMERA".to_string(),
                "ACS".to_string(),
            )]))
            .build();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props)).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path, None).unwrap();
        assert_eq!(table.instrument, Instrument::Acs);
        assert_eq!(table.mag1, vec![24.0, 25.5]);
        assert_eq!(table.mag2, vec![23.0, 24.0]);
    }

    #[test]
    fn parquet_schema_metadata_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema_meta.parquet");

        let metadata = HashMap::from([("CAMERA".to_string(), "WFPC2".to_string())]);
        let schema = Arc::new(
            Schema::new(vec![
                Field::new("MAG1_WFPC2", DataType::Float64, false),
                Field::new("MAG2_WFPC2", DataType::Float64, false),
                Field::new("MAG1_ERR", DataType::Float64, false),
                Field::new("MAG2_ERR", DataType::Float64, false),
            ])
            .with_metadata(metadata),
        );
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![21.0])),
                Arc::new(Float64Array::from(vec![20.0])),
                Arc::new(Float64Array::from(vec![0.01])),
                Arc::new(Float64Array::from(vec![0.02])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path, None).unwrap();
        assert_eq!(table.instrument, Instrument::Wfpc2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn malformed_files_keep_their_source_error() {
        use std::error::Error;

        let dir = TempDir::new().unwrap();
        let json = write(&dir, "bad.json", "{\"rows\": [");
        let err = load_file(&json, None).unwrap_err();
        assert!(matches!(err, PhotometryError::Json { .. }));
        assert!(err.source().is_some());

        let parquet = write(&dir, "bad.parquet", "not a parquet file");
        let err = load_file(&parquet, None).unwrap_err();
        assert!(matches!(err, PhotometryError::Parquet { ref context, .. } if context.contains("metadata")));
        assert!(err.source().is_some());
    }

    #[test]
    fn unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "phot.fits", "SIMPLE  =                    T");
        assert!(matches!(
            load_file(&path, None),
            Err(PhotometryError::DataFormat(ref m)) if m.contains(".fits")
        ));
    }

    #[test]
    fn header_cards_stop_at_first_data_line() {
        let cards = parse_header_cards(
            "# CAMERA = WFC3/UVIS / channel\n# TARGET='UGC 5336' / galaxy\na,b\n# IGNORED = 1\n",
        );
        assert_eq!(cards.get("CAMERA").map(String::as_str), Some("WFC3/UVIS"));
        assert_eq!(cards.get("TARGET").map(String::as_str), Some("UGC 5336"));
        assert!(!cards.contains_key("IGNORED"));
    }
}
