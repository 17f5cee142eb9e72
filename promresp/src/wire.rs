//! Shapes of the JSON bodies returned by `/api/v1/query` and
//! `/api/v1/query_range`.
//!
//! See https://prometheus.io/docs/prometheus/latest/querying/api/#format-overview

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::{AsRefStr, Display, EnumString};

use crate::{error::Error, value::Metric};

/// `(timestamp, value)` with the value still in its wire text.
pub type PointData = (f64, String);

/// Response envelope, tagged by `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub data: QueryData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<String>,
}

/// `data` of a successful response. `result` is decoded only once
/// `resultType` is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    pub result_type: String,
    pub result: JsonValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResultType {
    Scalar,
    String,
    Vector,
    Matrix,
}

/// Element of a `vector` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantSeriesData {
    pub metric: Metric,
    pub value: PointData,
}

/// Element of a `matrix` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSeriesData {
    pub metric: Metric,
    pub values: Vec<PointData>,
}

impl QueryResponse {
    /// Decodes the envelope from an already parsed JSON body.
    pub fn from_json(value: &JsonValue) -> Result<Self, Error> {
        Ok(Self::deserialize(value)?)
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            QueryResponse::Success(r) => &r.warnings,
            QueryResponse::Error(r) => &r.warnings,
        }
    }

    pub fn infos(&self) -> &[String] {
        match self {
            QueryResponse::Success(r) => &r.infos,
            QueryResponse::Error(r) => &r.infos,
        }
    }

    /// Returns `data`, or the upstream error if the status is `error`.
    pub fn into_data(self) -> Result<QueryData, Error> {
        for warning in self.warnings() {
            tracing::warn!(%warning, "prometheus reported a warning");
        }
        for info in self.infos() {
            tracing::debug!(%info, "prometheus reported an info");
        }
        match self {
            QueryResponse::Success(r) => Ok(r.data),
            QueryResponse::Error(r) => Err(Error::Upstream {
                error_type: r.error_type,
                message: r.error,
            }),
        }
    }
}

impl QueryData {
    pub fn kind(&self) -> Result<ResultType, Error> {
        self.result_type
            .parse()
            .map_err(|_| Error::UnknownResultType(self.result_type.clone()))
    }

    pub fn point(&self) -> Result<PointData, Error> {
        Ok(PointData::deserialize(&self.result)?)
    }

    pub fn instant_series(&self) -> Result<Vec<InstantSeriesData>, Error> {
        Ok(Vec::deserialize(&self.result)?)
    }

    pub fn range_series(&self) -> Result<Vec<RangeSeriesData>, Error> {
        Ok(Vec::deserialize(&self.result)?)
    }
}
