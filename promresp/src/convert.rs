//! Conversion of sample values from their wire text.
//!
//! Prometheus encodes sample values as JSON strings so that no precision is
//! lost in transit. [`Identity`] and [`ToDecimal`] keep the value exact;
//! [`ToFloat`] rounds to the nearest `f64`.

use std::{error::Error as StdError, fmt, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure of a [`ValueConverter`] on one sample value.
#[derive(Debug, Error)]
#[error("cannot convert sample value {value:?}: {source}")]
pub struct ConvertError {
    value: String,
    #[source]
    source: BoxError,
}

impl ConvertError {
    pub fn new(value: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }

    /// The text that could not be converted.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_source(self) -> BoxError {
        self.source
    }
}

/// Turns the text of a sample value into `Self::Value`.
///
/// A converter is shared by every parse call of a [`Parser`](crate::Parser)
/// and must be deterministic.
pub trait ValueConverter: Send + Sync {
    type Value;

    fn convert(&self, raw: &str) -> Result<Self::Value, ConvertError>;
}

impl<C: ValueConverter + ?Sized> ValueConverter for &C {
    type Value = C::Value;

    fn convert(&self, raw: &str) -> Result<Self::Value, ConvertError> {
        (**self).convert(raw)
    }
}

/// Keeps the value text unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl ValueConverter for Identity {
    type Value = String;

    fn convert(&self, raw: &str) -> Result<String, ConvertError> {
        Ok(raw.to_owned())
    }
}

/// Parses the value as `f64`. Lossy for values with more significant digits
/// than a double holds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToFloat;

impl ValueConverter for ToFloat {
    type Value = f64;

    fn convert(&self, raw: &str) -> Result<f64, ConvertError> {
        parse_str(raw)
    }
}

/// Parses the value as an exact [`Decimal`].
///
/// Values that do not fit a 96-bit mantissa with at most 28 fractional
/// digits are rejected rather than rounded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToDecimal;

impl ValueConverter for ToDecimal {
    type Value = Decimal;

    fn convert(&self, raw: &str) -> Result<Decimal, ConvertError> {
        Decimal::from_str_exact(raw).map_err(|e| ConvertError::new(raw, e))
    }
}

fn parse_str<T>(raw: &str) -> Result<T, ConvertError>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| ConvertError::new(raw, e))
}

/// Converter backed by a closure, see [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Creates a converter from a closure.
///
/// ```
/// let parser = promresp::Parser::new(promresp::convert::from_fn(|s: &str| s.parse::<u64>()));
/// # let _ = parser;
/// ```
pub fn from_fn<F, T, E>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync,
    E: Into<BoxError>,
{
    FromFn(f)
}

impl<F, T, E> ValueConverter for FromFn<F>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync,
    E: Into<BoxError>,
{
    type Value = T;

    fn convert(&self, raw: &str) -> Result<T, ConvertError> {
        (self.0)(raw).map_err(|e| ConvertError::new(raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_identity_keeps_text() {
        assert_eq!(Identity.convert("1.23456789").unwrap(), "1.23456789");
        assert_eq!(Identity.convert("NaN").unwrap(), "NaN");
    }

    #[test]
    fn test_to_float() {
        assert_eq!(ToFloat.convert("5").unwrap(), 5.0);
        assert_eq!(ToFloat.convert("-0.25").unwrap(), -0.25);
        assert!(ToFloat.convert("+Inf").unwrap().is_infinite());
        assert!(ToFloat.convert("NaN").unwrap().is_nan());

        let err = ToFloat.convert("five").unwrap_err();
        assert_eq!(err.value(), "five");
        expect![[r#"cannot convert sample value "five": invalid float literal"#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn test_to_decimal_is_exact() {
        let value = ToDecimal.convert("1.23456789").unwrap();
        assert_eq!(value, Decimal::new(123456789, 8));
        assert_eq!(value.to_string(), "1.23456789");

        let value = ToDecimal.convert("0.0000000000000000000000000001").unwrap();
        assert_eq!(value, Decimal::new(1, 28));
        assert!(ToDecimal.convert("NaN").is_err());
        assert!(ToDecimal.convert("+Inf").is_err());
    }

    #[test]
    fn test_to_decimal_rejects_precision_loss() {
        for raw in [
            // more than 28 fractional digits
            "0.000000000000000000000000000000123",
            "1.23456789012345678901234567890123",
            // above the 96-bit mantissa
            "1000000000000000019884624838656",
        ] {
            let err = ToDecimal.convert(raw).unwrap_err();
            assert_eq!(err.value(), raw);
        }
    }

    #[test]
    fn test_from_fn() {
        let conv = from_fn(|s: &str| s.parse::<u64>());
        assert_eq!(conv.convert("42").unwrap(), 42);

        let err = conv.convert("-1").unwrap_err();
        assert_eq!(err.value(), "-1");
        assert!(err.into_source().is::<std::num::ParseIntError>());
    }
}
