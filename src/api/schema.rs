use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::data::{Dataset, FilterQuery, Record};

/// Serializes every record of a shared dataset without cloning it.
pub struct AllRecords(pub Arc<Dataset>);

impl Serialize for AllRecords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.records())
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BattAliasesResponse {
    pub batt_aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ContinentsResponse {
    pub continents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelSeriesResponse {
    pub model_series: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub records: usize,
}

/// Query string of `/api/v1/data/filtered`.
///
/// Everything is optional at this level so a missing `metric` produces our
/// own JSON error instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub metric: Option<String>,
    pub batt_alias: Option<String>,
    pub continent: Option<String>,
    pub climate: Option<String>,
    pub model_series: Option<String>,
}

impl FilterParams {
    pub fn into_query(self) -> FilterQuery {
        let mut query = FilterQuery::new(
            self.metric.unwrap_or_default(),
            self.batt_alias.unwrap_or_default(),
        );
        if let Some(continent) = self.continent {
            query = query.continent(continent);
        }
        if let Some(climate) = self.climate {
            query = query.climate(climate);
        }
        if let Some(model_series) = self.model_series {
            query = query.model_series(model_series);
        }
        query
    }
}

#[derive(Debug, Serialize)]
pub struct FilteredResponse<'a> {
    pub data: Vec<&'a Record>,
    pub total: usize,
    pub metric: &'a str,
    pub batt_alias: &'a str,
    pub continent: Option<&'a str>,
    pub climate: Option<&'a str>,
    pub model_series: Option<&'a str>,
}

impl<'a> FilteredResponse<'a> {
    pub fn new(query: &'a FilterQuery, data: Vec<&'a Record>) -> Self {
        Self {
            total: data.len(),
            data,
            metric: &query.metric,
            batt_alias: &query.batt_alias,
            continent: query.continent.as_deref(),
            climate: query.climate.as_deref(),
            model_series: query.model_series.as_deref(),
        }
    }
}
