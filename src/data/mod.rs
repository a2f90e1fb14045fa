/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (team column normalized)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<PlayerRecord>, column index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → reduced Table
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
