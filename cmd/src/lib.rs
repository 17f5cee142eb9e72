use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use promresp::{
    query::RequestArg,
    value::{TYPE_MATRIX, TYPE_VECTOR},
    Identity, Parser, ToDecimal, ToFloat, ValueConverter,
};
use serde::Serialize;
use serde_json::{json, Value};

/// How sample values are represented in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Converter {
    /// Keep the value text as received
    #[default]
    Identity,
    /// 64-bit float, may lose precision
    Float,
    /// Exact decimal
    Decimal,
}

/// Which parse operation to run on the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Instant query: scalar, string or vector
    #[default]
    Query,
    /// Range query: matrix
    QueryRange,
    /// The single value of a scalar, string or one-series vector
    Value,
    /// Instant query that must return a vector
    Vector,
}

/// Reads and decodes a JSON response body. `None` or `-` reads stdin.
pub fn read_response(path: Option<&Path>) -> Result<Value> {
    let data = match path {
        Some(path) if path != Path::new("-") => {
            fs::read(path).wrap_err_with(|| format!("{}", path.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .wrap_err("failed to read stdin")?;
            buf
        }
    };
    tracing::debug!(bytes = data.len(), "read response body");
    serde_json::from_slice(&data).wrap_err("response body is not valid JSON")
}

/// Parses `resp` and renders the typed result back as JSON.
pub fn parse(resp: &Value, mode: Mode, converter: Converter) -> Result<Value> {
    match converter {
        Converter::Identity => parse_with(resp, mode, Identity),
        Converter::Float => parse_with(resp, mode, ToFloat),
        Converter::Decimal => parse_with(resp, mode, ToDecimal),
    }
}

fn parse_with<C>(resp: &Value, mode: Mode, converter: C) -> Result<Value>
where
    C: ValueConverter,
    C::Value: Serialize,
{
    let parser = Parser::new(converter);
    let value = match mode {
        Mode::Query => {
            let result = parser.parse_query_response(resp)?;
            json!({"resultType": result.result_type(), "result": result})
        }
        Mode::QueryRange => json!({"resultType": TYPE_MATRIX, "result": parser.parse_query_range_response(resp)?}),
        Mode::Value => serde_json::to_value(parser.parse_query_response_as_value(resp)?)?,
        Mode::Vector => json!({"resultType": TYPE_VECTOR, "result": parser.parse_query_response_as_vector(resp)?}),
    };
    Ok(value)
}

pub fn request_json(arg: &RequestArg) -> Value {
    json!({"url": arg.url.as_str(), "params": arg.params})
}
