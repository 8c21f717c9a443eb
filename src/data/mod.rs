/// Data layer: record types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  world_kpi_anonym.csv  (semicolon-delimited)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + normalize → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one Arc<Dataset> per canonical path
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, distinct-value index per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality predicates → matching records
///   └──────────┘
/// ```
///
/// Nothing in here knows about HTTP.

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

pub use cache::DatasetCache;
pub use error::{LoadError, QueryError};
pub use filter::{filter, FilterQuery};
pub use model::{Dataset, Record};
