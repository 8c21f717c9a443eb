use super::error::QueryError;
use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: required metric/alias plus optional narrowing fields
// ---------------------------------------------------------------------------

/// An AND-combination of equality predicates.
///
/// `metric` and `batt_alias` are mandatory and must occur in the dataset.
/// The optional fields narrow the match only when present and non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub metric: String,
    pub batt_alias: String,
    pub continent: Option<String>,
    pub climate: Option<String>,
    pub model_series: Option<String>,
}

impl FilterQuery {
    pub fn new(metric: impl Into<String>, batt_alias: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            batt_alias: batt_alias.into(),
            ..Self::default()
        }
    }

    pub fn continent(mut self, continent: impl Into<String>) -> Self {
        self.continent = Some(continent.into());
        self
    }

    pub fn climate(mut self, climate: impl Into<String>) -> Self {
        self.climate = Some(climate.into());
        self
    }

    pub fn model_series(mut self, model_series: impl Into<String>) -> Self {
        self.model_series = Some(model_series.into());
        self
    }

    /// Check the mandatory fields against the loaded data.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), QueryError> {
        if self.metric.trim().is_empty() {
            return Err(QueryError::MissingParameter("metric"));
        }
        if self.batt_alias.trim().is_empty() {
            return Err(QueryError::MissingParameter("batt_alias"));
        }
        if !dataset.contains(Column::Metric, &self.metric) {
            return Err(QueryError::InvalidFilter {
                field: "metric",
                value: self.metric.clone(),
            });
        }
        if !dataset.contains(Column::BattAlias, &self.batt_alias) {
            return Err(QueryError::InvalidFilter {
                field: "batt_alias",
                value: self.batt_alias.clone(),
            });
        }
        Ok(())
    }

    /// The (column, value) pairs a record must match.
    fn predicates(&self) -> Vec<(Column, &str)> {
        let mut predicates = vec![
            (Column::Metric, self.metric.as_str()),
            (Column::BattAlias, self.batt_alias.as_str()),
        ];
        let optional = [
            (Column::Continent, &self.continent),
            (Column::Climate, &self.climate),
            (Column::ModelSeries, &self.model_series),
        ];
        for (column, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                predicates.push((column, value));
            }
        }
        predicates
    }
}

fn matches_all(predicates: &[(Column, &str)], record: &Record) -> bool {
    predicates
        .iter()
        .all(|(column, value)| column.value_of(record) == *value)
}

/// Return indices of records that pass the query, in dataset order.
///
/// An empty result is not an error: the combination may simply have no data.
pub fn filtered_indices(dataset: &Dataset, query: &FilterQuery) -> Result<Vec<usize>, QueryError> {
    query.validate(dataset)?;
    let predicates = query.predicates();

    Ok(dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_all(&predicates, record))
        .map(|(i, _)| i)
        .collect())
}

/// Return the records that pass the query, in dataset order.
pub fn filter<'a>(dataset: &'a Dataset, query: &FilterQuery) -> Result<Vec<&'a Record>, QueryError> {
    let records = dataset.records();
    Ok(filtered_indices(dataset, query)?
        .into_iter()
        .map(|i| &records[i])
        .collect())
}
