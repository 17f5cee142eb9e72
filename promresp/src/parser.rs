use serde_json::Value as JsonValue;

use crate::{
    convert::{Identity, ValueConverter},
    error::{Error, Result},
    value::{InstantSeries, InstantVector, Matrix, Point, QueryResult, RangeSeries},
    wire::{InstantSeriesData, PointData, QueryData, QueryResponse, RangeSeriesData, ResultType},
};

/// Parses query responses, converting every sample value with `C`.
///
/// A parser holds no state besides its converter and can be shared between
/// threads.
#[derive(Debug, Default, Clone)]
pub struct Parser<C = Identity> {
    converter: C,
}

impl<C: ValueConverter> Parser<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Parses the response of an instant query (`/api/v1/query`).
    pub fn parse_query_response(&self, resp: &JsonValue) -> Result<QueryResult<C::Value>> {
        let data = decode(resp)?;
        let parsed = match data.kind()? {
            ResultType::String => {
                let (timestamp, value) = data.point()?;
                QueryResult::String(Point { timestamp, value })
            }
            ResultType::Scalar => QueryResult::Scalar(self.point(data.point()?)?),
            ResultType::Vector => QueryResult::Vector(self.vector(data.instant_series()?)?),
            ResultType::Matrix => return Err(Error::UnknownResultType(data.result_type)),
        };
        tracing::debug!(result_type = parsed.result_type(), "parsed query response");
        Ok(parsed)
    }

    /// Parses the response of a range query (`/api/v1/query_range`), which
    /// is always a matrix.
    pub fn parse_query_range_response(&self, resp: &JsonValue) -> Result<Matrix<C::Value>> {
        let data = decode(resp)?;
        if data.kind()? != ResultType::Matrix {
            return Err(Error::UnknownResultType(data.result_type));
        }
        let series = data
            .range_series()?
            .into_iter()
            .map(|s| self.range_series(s))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(series = series.len(), "parsed query range response");
        Ok(Matrix { series })
    }

    /// Returns the single value of a query known to reduce to one number.
    ///
    /// A `vector` result must contain exactly one series.
    pub fn parse_query_response_as_value(&self, resp: &JsonValue) -> Result<C::Value> {
        let data = decode(resp)?;
        let (_, value) = match data.kind()? {
            ResultType::String | ResultType::Scalar => data.point()?,
            ResultType::Vector => {
                let mut series = data.instant_series()?;
                if series.len() != 1 {
                    return Err(Error::SeriesCount(series.len()));
                }
                series.swap_remove(0).value
            }
            ResultType::Matrix => return Err(Error::UnknownResultType(data.result_type)),
        };
        Ok(self.converter.convert(&value)?)
    }

    /// Like [`Parser::parse_query_response`], but only accepts a `vector`
    /// result.
    pub fn parse_query_response_as_vector(&self, resp: &JsonValue) -> Result<InstantVector<C::Value>> {
        let data = decode(resp)?;
        if data.kind()? != ResultType::Vector {
            return Err(Error::UnknownResultType(data.result_type));
        }
        self.vector(data.instant_series()?)
    }

    fn point(&self, (timestamp, value): PointData) -> Result<Point<C::Value>> {
        Ok(Point {
            timestamp,
            value: self.converter.convert(&value)?,
        })
    }

    fn vector(&self, data: Vec<InstantSeriesData>) -> Result<InstantVector<C::Value>> {
        let series = data
            .into_iter()
            .map(|s| {
                Ok(InstantSeries {
                    metric: s.metric,
                    value: self.point(s.value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(series = series.len(), "parsed instant vector");
        Ok(InstantVector { series })
    }

    fn range_series(&self, data: RangeSeriesData) -> Result<RangeSeries<C::Value>> {
        let values = data
            .values
            .into_iter()
            .map(|p| self.point(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(RangeSeries {
            metric: data.metric,
            values,
        })
    }
}

/// Decodes the envelope and fails on an error status before `data` is
/// looked at.
fn decode(resp: &JsonValue) -> Result<QueryData> {
    QueryResponse::from_json(resp)?.into_data()
}

/// One-off [`Parser::parse_query_response`] with the given converter.
pub fn parse_query_response_with<C: ValueConverter>(
    resp: &JsonValue,
    converter: C,
) -> Result<QueryResult<C::Value>> {
    Parser::new(converter).parse_query_response(resp)
}
