use indexmap::IndexMap;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

pub const TYPE_SCALAR: &str = "scalar";
pub const TYPE_STRING: &str = "string";
pub const TYPE_VECTOR: &str = "vector";
pub const TYPE_MATRIX: &str = "matrix";

/// Label set of a series, in the order the labels were decoded.
pub type Metric = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Point<T> {
    /// Unix time in seconds
    pub timestamp: f64,
    pub value: T,
}

impl<T> Point<T> {
    pub fn new(timestamp: f64, value: T) -> Self {
        Self { timestamp, value }
    }
}

impl<T: Serialize> Serialize for Point<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.timestamp)?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantSeries<T> {
    pub metric: Metric,
    pub value: Point<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantVector<T> {
    pub series: Vec<InstantSeries<T>>,
}

impl<T> InstantVector<T> {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstantSeries<T>> {
        self.series.iter()
    }
}

impl<'a, T> IntoIterator for &'a InstantVector<T> {
    type Item = &'a InstantSeries<T>;
    type IntoIter = std::slice::Iter<'a, InstantSeries<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Samples of one series over the queried range. Points keep the order they
/// were received in; nothing is sorted or checked for monotonicity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSeries<T> {
    pub metric: Metric,
    pub values: Vec<Point<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<T> {
    pub series: Vec<RangeSeries<T>>,
}

impl<T> Matrix<T> {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RangeSeries<T>> {
        self.series.iter()
    }
}

impl<'a, T> IntoIterator for &'a Matrix<T> {
    type Item = &'a RangeSeries<T>;
    type IntoIter = std::slice::Iter<'a, RangeSeries<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Result of an instant query.
///
/// A `string` result always keeps its text: it is never handed to the
/// value converter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult<T> {
    String(Point<String>),
    Scalar(Point<T>),
    Vector(InstantVector<T>),
}

impl<T> QueryResult<T> {
    pub fn result_type(&self) -> &'static str {
        match self {
            QueryResult::String(_) => TYPE_STRING,
            QueryResult::Scalar(_) => TYPE_SCALAR,
            QueryResult::Vector(_) => TYPE_VECTOR,
        }
    }

    pub fn into_vector(self) -> Option<InstantVector<T>> {
        match self {
            QueryResult::Vector(v) => Some(v),
            _ => None,
        }
    }
}
