/// Data layer: instruments, core types, loading, and sentinel filtering.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, resolve camera → PhotometryTable
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ PhotometryTable  │  mag1, mag2, mag1_err, mag2_err
///   └─────────────────┘
///        │  to_cmd(YFilter)
///        ▼
///   ┌──────────┐
///   │  CmdData  │  color, mag, color_err, mag_err
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop sentinel rows (|value| ≥ 30)
///   └──────────┘
/// ```

pub mod filter;
pub mod instrument;
pub mod loader;
pub mod model;
