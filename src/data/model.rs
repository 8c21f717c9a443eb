use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::QueryError;

/// Continents the dataset is expected to use. Anything else is kept verbatim
/// but logged at load time.
pub const KNOWN_CONTINENTS: [&str; 6] = [
    "Europe",
    "Asia",
    "North America",
    "South America",
    "Africa",
    "Oceania",
];

// ---------------------------------------------------------------------------
// Record – one normalized row of the source file
// ---------------------------------------------------------------------------

/// A single KPI measurement for one country and battery variant.
///
/// Serializes with the source file's column names so the JSON the API returns
/// matches the header the data team maintains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Always exactly three uppercase characters.
    pub iso_a3: String,
    pub country: String,
    #[serde(rename = "battAlias")]
    pub batt_alias: String,
    /// The metric name.
    #[serde(rename = "var")]
    pub metric: String,
    /// `None` when the source cell was not a number.
    pub val: Option<f64>,
    pub cnt_vhcl: i64,
    pub continent: String,
    pub climate: String,
    pub model_series: String,
}

impl Record {
    /// Whether the row carries a usable measurement.
    pub fn has_valid_val(&self) -> bool {
        self.val.is_some_and(f64::is_finite)
    }
}

// ---------------------------------------------------------------------------
// Column – the categorical columns that support distinct-value queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Metric,
    BattAlias,
    Continent,
    Climate,
    ModelSeries,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Metric,
        Column::BattAlias,
        Column::Continent,
        Column::Climate,
        Column::ModelSeries,
    ];

    /// Header name of the column in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Metric => "var",
            Column::BattAlias => "battAlias",
            Column::Continent => "continent",
            Column::Climate => "climate",
            Column::ModelSeries => "model_series",
        }
    }

    /// Borrow this column's cell from a record.
    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Column::Metric => &record.metric,
            Column::BattAlias => &record.batt_alias,
            Column::Continent => &record.continent,
            Column::Climate => &record.climate,
            Column::ModelSeries => &record.model_series,
        }
    }
}

impl FromStr for Column {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "var" | "metric" => Ok(Column::Metric),
            "battAlias" | "batt_alias" => Ok(Column::BattAlias),
            "continent" => Ok(Column::Continent),
            "climate" => Ok(Column::Climate),
            "model_series" => Ok(Column::ModelSeries),
            other => Err(QueryError::ColumnNotFound(other.to_string())),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full normalized table with pre-computed distinct-value indices.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// For each categorical column the non-empty values in first-occurrence order.
    distinct: BTreeMap<Column, Vec<String>>,
}

impl Dataset {
    /// Build column indices from normalized records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut distinct: BTreeMap<Column, Vec<String>> = BTreeMap::new();

        for column in Column::ALL {
            let mut seen: HashSet<&str> = HashSet::new();
            let values = records
                .iter()
                .map(|r| column.value_of(r))
                .filter(|v| !v.trim().is_empty() && seen.insert(*v))
                .map(str::to_string)
                .collect();
            distinct.insert(column, values);
        }

        Dataset { records, distinct }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose `val` parsed as a number.
    pub fn valid_val_count(&self) -> usize {
        self.records.iter().filter(|r| r.has_valid_val()).count()
    }

    /// Distinct non-empty values of `column`, first-occurrence order.
    pub fn distinct_values(&self, column: Column) -> &[String] {
        self.distinct.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Same as [`Dataset::distinct_values`] but addressed by header name.
    pub fn distinct_values_by_name(&self, column: &str) -> Result<&[String], QueryError> {
        let column: Column = column.parse()?;
        Ok(self.distinct_values(column))
    }

    /// Whether `value` occurs in `column` anywhere in the dataset.
    pub fn contains(&self, column: Column, value: &str) -> bool {
        self.distinct_values(column).iter().any(|v| v == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(metric: &str, alias: &str, continent: &str) -> Record {
        Record {
            iso_a3: "DEU".to_string(),
            country: "Germany".to_string(),
            batt_alias: alias.to_string(),
            metric: metric.to_string(),
            val: Some(1.0),
            cnt_vhcl: 0,
            continent: continent.to_string(),
            climate: String::new(),
            model_series: String::new(),
        }
    }

    #[test]
    fn distinct_values_keep_first_occurrence_order() {
        let ds = Dataset::from_records(vec![
            record("temp", "Batt_1", "Europe"),
            record("temp", "Batt_1", "Asia"),
            record("temp", "Batt_1", "Europe"),
            record("temp", "Batt_1", ""),
            record("temp", "Batt_1", "Africa"),
        ]);
        assert_eq!(
            ds.distinct_values(Column::Continent),
            ["Europe", "Asia", "Africa"]
        );
    }

    #[test]
    fn distinct_values_of_blank_column_is_empty() {
        let ds = Dataset::from_records(vec![record("temp", "Batt_1", "Europe")]);
        assert!(ds.distinct_values(Column::ModelSeries).is_empty());
        assert!(ds.distinct_values(Column::Climate).is_empty());
    }

    #[test]
    fn distinct_values_by_name_rejects_unknown_column() {
        let ds = Dataset::from_records(vec![record("temp", "Batt_1", "Europe")]);
        assert_eq!(ds.distinct_values_by_name("var").unwrap(), ["temp"]);
        assert_eq!(
            ds.distinct_values_by_name("colour"),
            Err(QueryError::ColumnNotFound("colour".to_string()))
        );
    }

    #[test]
    fn record_serializes_with_source_column_names() {
        let mut r = record("temp", "Batt_1", "Europe");
        r.val = None;
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["battAlias"], "Batt_1");
        assert_eq!(json["var"], "temp");
        assert!(json["val"].is_null());
        assert!(json.get("batt_alias").is_none());
    }

    #[test]
    fn nan_val_is_not_valid() {
        let mut r = record("temp", "Batt_1", "Europe");
        r.val = Some(f64::NAN);
        assert!(!r.has_valid_val());
    }
}
