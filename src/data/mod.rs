/// Data layer: core types, loading, cleaning, projection and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx upload
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean   │  drop duplicates, mean-fill numeric gaps (in place)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ columns  │  keep the selected columns → new Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  chart   │   │  export  │  Table → CSV / XLSX bytes
///   └──────────┘   └──────────┘
/// ```

pub mod chart;
pub mod clean;
pub mod columns;
pub mod export;
pub mod loader;
pub mod model;
