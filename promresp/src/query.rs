//! Request arguments for the instant and range query endpoints.

use indexmap::IndexMap;
use thiserror::Error;
use url::Url;

/// Number of steps a range query is split into when no step is given.
pub const DEFAULT_STEP_COUNT: u32 = 60;

const QUERY_PATH: &str = "api/v1/query";
const QUERY_RANGE_PATH: &str = "api/v1/query_range";

#[derive(Debug, Error)]
pub enum ArgError {
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("end must be greater than start")]
    EmptyRange,
    #[error("step count must be positive")]
    ZeroStepCount,
    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// URL and query-string parameters of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestArg {
    pub url: Url,
    pub params: IndexMap<String, String>,
}

/// Arguments for `/api/v1/query`. `time` is only sent when given and
/// non-zero.
pub fn build_arg_for_query(base_url: &str, query: &str, time: Option<f64>) -> Result<RequestArg, ArgError> {
    let url = join(base_url, QUERY_PATH)?;
    let mut params = IndexMap::from([("query".to_owned(), query.to_owned())]);
    if let Some(time) = time.filter(|t| *t != 0.0) {
        params.insert("time".to_owned(), time.to_string());
    }
    Ok(RequestArg { url, params })
}

/// Arguments for `/api/v1/query_range`.
///
/// Without an explicit `step` the range is split into `step_count` steps
/// (default [`DEFAULT_STEP_COUNT`]) of whole seconds, at least one second
/// each.
pub fn build_arg_for_query_range(
    base_url: &str,
    query: &str,
    start: f64,
    end: f64,
    step: Option<f64>,
    step_count: Option<u32>,
) -> Result<RequestArg, ArgError> {
    let url = join(base_url, QUERY_RANGE_PATH)?;
    finite("start", start)?;
    finite("end", end)?;
    let step = match step {
        Some(step) => finite("step", step)?,
        None => default_step(start, end, step_count.unwrap_or(DEFAULT_STEP_COUNT))?,
    };
    let params = IndexMap::from([
        ("query".to_owned(), query.to_owned()),
        ("start".to_owned(), start.to_string()),
        ("end".to_owned(), end.to_string()),
        ("step".to_owned(), step.to_string()),
    ]);
    Ok(RequestArg { url, params })
}

fn default_step(start: f64, end: f64, step_count: u32) -> Result<f64, ArgError> {
    if start >= end {
        return Err(ArgError::EmptyRange);
    }
    if step_count == 0 {
        return Err(ArgError::ZeroStepCount);
    }
    Ok(((end - start) / f64::from(step_count)).floor().max(1.0))
}

fn finite(name: &'static str, value: f64) -> Result<f64, ArgError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArgError::NonFinite { name, value })
    }
}

fn join(base_url: &str, path: &str) -> Result<Url, ArgError> {
    Url::parse(base_url)
        .and_then(|base| base.join(path))
        .map_err(|source| ArgError::BaseUrl {
            url: base_url.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    const BASE_URL: &str = "https://example.org/prometheus/";
    const METRIC: &str = "prometheus_target_interval_length_seconds";

    #[test]
    fn test_query() {
        let arg = build_arg_for_query(BASE_URL, METRIC, None).unwrap();
        assert_eq!(arg.url.as_str(), "https://example.org/prometheus/api/v1/query");
        assert_eq!(arg.params["query"], METRIC);
        assert!(!arg.params.contains_key("time"));
    }

    #[test]
    fn test_query_with_time() {
        let arg = build_arg_for_query(BASE_URL, METRIC, Some(1435781451.0)).unwrap();
        assert_eq!(arg.params["time"], "1435781451");

        let arg = build_arg_for_query(BASE_URL, METRIC, Some(1435781451.781)).unwrap();
        assert_eq!(arg.params["time"], "1435781451.781");

        let arg = build_arg_for_query(BASE_URL, METRIC, Some(0.0)).unwrap();
        assert!(!arg.params.contains_key("time"));
    }

    #[test]
    fn test_query_range() {
        let start = 1435781451.0;
        let end = start + 5.0 * 60.0;

        let arg = build_arg_for_query_range(BASE_URL, METRIC, start, end, None, None).unwrap();
        assert_eq!(arg.url.as_str(), "https://example.org/prometheus/api/v1/query_range");
        expect![[r#"
            {
                "query": "prometheus_target_interval_length_seconds",
                "start": "1435781451",
                "end": "1435781751",
                "step": "5",
            }
        "#]]
        .assert_debug_eq(&arg.params);
    }

    #[test]
    fn test_query_range_with_step() {
        let start = 1435781451.0;
        let end = start + 5.0 * 60.0;
        let arg = build_arg_for_query_range(BASE_URL, METRIC, start, end, Some(15.0), None).unwrap();
        assert_eq!(arg.params["step"], "15");
    }

    #[test]
    fn test_query_range_step_rounding() {
        // 100s / 60 steps rounds down to 1s
        let arg = build_arg_for_query_range(BASE_URL, METRIC, 0.0, 100.0, None, None).unwrap();
        assert_eq!(arg.params["step"], "1");
        // shorter than one step per second
        let arg = build_arg_for_query_range(BASE_URL, METRIC, 0.0, 30.0, None, None).unwrap();
        assert_eq!(arg.params["step"], "1");
        let arg = build_arg_for_query_range(BASE_URL, METRIC, 0.0, 3600.0, None, Some(10)).unwrap();
        assert_eq!(arg.params["step"], "360");
    }

    #[test]
    fn test_query_range_errors() {
        let err = build_arg_for_query_range(BASE_URL, METRIC, 10.0, 10.0, None, None).unwrap_err();
        expect!["end must be greater than start"].assert_eq(&err.to_string());

        // explicit step skips the range check
        assert!(build_arg_for_query_range(BASE_URL, METRIC, 10.0, 10.0, Some(1.0), None).is_ok());

        let err = build_arg_for_query_range(BASE_URL, METRIC, 0.0, 10.0, None, Some(0)).unwrap_err();
        assert!(matches!(err, ArgError::ZeroStepCount));

        let err = build_arg_for_query("not a url", METRIC, None).unwrap_err();
        expect![[r#"invalid base url "not a url": relative URL without a base"#]].assert_eq(&err.to_string());
    }

    #[test]
    fn test_query_range_non_finite() {
        let err = build_arg_for_query_range(BASE_URL, METRIC, f64::NAN, 100.0, None, None).unwrap_err();
        expect!["start must be a finite number, got NaN"].assert_eq(&err.to_string());

        let err = build_arg_for_query_range(BASE_URL, METRIC, 0.0, f64::INFINITY, None, None).unwrap_err();
        expect!["end must be a finite number, got inf"].assert_eq(&err.to_string());

        let err = build_arg_for_query_range(BASE_URL, METRIC, 0.0, 100.0, Some(f64::NAN), None).unwrap_err();
        assert!(matches!(err, ArgError::NonFinite { name: "step", .. }));
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        // relative resolution replaces the last path segment
        let arg = build_arg_for_query("https://example.org/prometheus", METRIC, None).unwrap();
        assert_eq!(arg.url.as_str(), "https://example.org/api/v1/query");
    }
}
