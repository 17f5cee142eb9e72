//! Typed parsing of Prometheus HTTP API query responses.
//!
//! See https://prometheus.io/docs/prometheus/latest/querying/api/#expression-query-result-formats

pub mod convert;
mod error;
mod parser;
pub mod query;
pub mod value;
pub mod wire;

pub use {
    convert::{ConvertError, Identity, ToDecimal, ToFloat, ValueConverter},
    error::{Error, Result},
    parser::{parse_query_response_with, Parser},
};
