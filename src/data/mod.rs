/// Data layer: core types, loading, and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (dtype inference)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  typed columns, unique names
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ summary   │   │  stats    │  quantiles, bins, KDE, category counts
///   └──────────┘   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;
pub mod summary;
