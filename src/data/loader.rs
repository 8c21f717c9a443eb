use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};

use super::error::LoadError;
use super::model::{Column, Dataset, Record, KNOWN_CONTINENTS};

/// Columns every source file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["iso_a3", "country", "battAlias", "var", "val"];

const DELIMITER: u8 = b';';

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize a semicolon-delimited KPI file.
///
/// Layout: a header row naming at least [`REQUIRED_COLUMNS`]; `cnt_vhcl`,
/// `continent`, `climate` and `model_series` are optional and default to
/// `0` / empty when the column is absent.
///
/// Rows whose `country`, `battAlias` or `var` is blank are dropped. Rows
/// whose `val` is not a number are kept with `val = None`, but at least one
/// row must carry a numeric `val`.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(LoadError::EmptyData(path.to_path_buf()));
    }
    let layout = ColumnLayout::resolve(&headers, path)?;

    let mut records = Vec::new();
    let mut total_rows = 0usize;
    let mut dropped_rows = 0usize;
    let mut unknown_continents: BTreeSet<String> = BTreeSet::new();

    let mut row = StringRecord::new();
    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(csv_error(path, e)),
        }
        total_rows += 1;

        match layout.normalize(&row) {
            Some(record) => {
                if !record.continent.is_empty()
                    && !KNOWN_CONTINENTS.contains(&record.continent.as_str())
                {
                    unknown_continents.insert(record.continent.clone());
                }
                records.push(record);
            }
            None => {
                dropped_rows += 1;
                debug!("row {total_rows}: blank country, battAlias or var; dropped");
            }
        }
    }

    if total_rows == 0 {
        return Err(LoadError::EmptyData(path.to_path_buf()));
    }
    if dropped_rows > 0 {
        warn!(
            "{}: dropped {dropped_rows} of {total_rows} rows with blank country, battAlias or var",
            path.display()
        );
    }
    for continent in &unknown_continents {
        warn!("{}: unexpected continent '{continent}'", path.display());
    }
    if records.is_empty() {
        return Err(LoadError::DataQuality {
            path: path.to_path_buf(),
            reason: "every row is missing country, battAlias or var".to_string(),
        });
    }

    let dataset = Dataset::from_records(records);
    let valid = dataset.valid_val_count();
    if valid == 0 {
        return Err(LoadError::DataQuality {
            path: path.to_path_buf(),
            reason: "no row has a numeric val".to_string(),
        });
    }

    info!(
        "loaded {} records from {} ({} without numeric val, {} metrics, {} battery aliases)",
        dataset.len(),
        path.display(),
        dataset.len() - valid,
        dataset.distinct_values(Column::Metric).len(),
        dataset.distinct_values(Column::BattAlias).len(),
    );
    Ok(dataset)
}

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    if !err.is_io_error() {
        return LoadError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
    }
    match err.into_kind() {
        csv::ErrorKind::Io(source) if source.kind() == io::ErrorKind::NotFound => {
            LoadError::NotFound(path.to_path_buf())
        }
        csv::ErrorKind::Io(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => LoadError::Parse {
            path: path.to_path_buf(),
            message: format!("{other:?}"),
        },
    }
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Position of every known column in the header row.
#[derive(Debug)]
struct ColumnLayout {
    iso_a3: usize,
    country: usize,
    batt_alias: usize,
    metric: usize,
    val: usize,
    cnt_vhcl: Option<usize>,
    continent: Option<usize>,
    climate: Option<usize>,
    model_series: Option<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self, LoadError> {
        // Spreadsheet exports often prefix the first header with a BOM.
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let position = |name: &str| names.iter().position(|h| *h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(**c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }

        let required = |name: &str| {
            position(name).ok_or_else(|| LoadError::Schema {
                path: path.to_path_buf(),
                missing: vec![name.to_string()],
            })
        };

        let layout = ColumnLayout {
            iso_a3: required("iso_a3")?,
            country: required("country")?,
            batt_alias: required("battAlias")?,
            metric: required("var")?,
            val: required("val")?,
            cnt_vhcl: position("cnt_vhcl"),
            continent: position("continent"),
            climate: position("climate"),
            model_series: position("model_series"),
        };
        if layout.climate.is_none() {
            debug!("{}: no climate column, defaulting to empty", path.display());
        }
        if layout.model_series.is_none() {
            debug!("{}: no model_series column, defaulting to empty", path.display());
        }
        Ok(layout)
    }

    /// Normalize one row. `None` when a required text field is blank.
    fn normalize(&self, row: &StringRecord) -> Option<Record> {
        let text = |idx: usize| row.get(idx).unwrap_or("").to_string();
        let optional = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").to_string();

        let country = text(self.country);
        let batt_alias = text(self.batt_alias);
        let metric = text(self.metric);
        if country.is_empty() || batt_alias.is_empty() || metric.is_empty() {
            return None;
        }

        Some(Record {
            iso_a3: normalize_iso_a3(row.get(self.iso_a3).unwrap_or(""), &country),
            val: parse_val(row.get(self.val).unwrap_or("")),
            cnt_vhcl: parse_count(self.cnt_vhcl.and_then(|i| row.get(i)).unwrap_or("")),
            continent: optional(self.continent),
            climate: optional(self.climate),
            model_series: optional(self.model_series),
            country,
            batt_alias,
            metric,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell normalization
// ---------------------------------------------------------------------------

/// Character appended to codes shorter than three characters.
pub const ISO_PAD: char = 'X';

/// Force a country code to exactly three uppercase characters.
///
/// A blank code is derived from the country name.
pub fn normalize_iso_a3(raw: &str, country: &str) -> String {
    let source = match raw.trim() {
        "" => country.trim(),
        code => code,
    };
    let mut code: String = source.chars().flat_map(char::to_uppercase).take(3).collect();
    while code.chars().count() < 3 {
        code.push(ISO_PAD);
    }
    code
}

/// Parse a measurement; anything that is not a finite number is missing.
pub fn parse_val(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a vehicle count, defaulting to zero.
///
/// Integral floats such as `"12.0"` are accepted since pandas writes integer
/// columns containing gaps that way.
pub fn parse_count(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
        _ => 0,
    }
}
