use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use promresp::query;
use promresp_cli::{Converter, Mode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Typed parsing of Prometheus HTTP API query responses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a query response body and print the typed result as JSON
    Parse {
        #[arg(short, long, value_enum, default_value_t)]
        mode: Mode,
        #[arg(short, long, value_enum, default_value_t)]
        convert: Converter,
        /// File holding the response body; stdin if omitted or `-`
        file: Option<PathBuf>,
    },
    /// Print the URL and parameters of an instant query
    Query {
        #[arg(long, env = "PROMRESP_BASE_URL")]
        base_url: String,
        /// PromQL expression
        expr: String,
        /// Evaluation timestamp, Unix seconds
        #[arg(long)]
        time: Option<f64>,
    },
    /// Print the URL and parameters of a range query
    QueryRange {
        #[arg(long, env = "PROMRESP_BASE_URL")]
        base_url: String,
        /// PromQL expression
        expr: String,
        /// Unix seconds; defaults to 30 minutes before `end`
        #[arg(long)]
        start: Option<f64>,
        /// Unix seconds; defaults to now
        #[arg(long)]
        end: Option<f64>,
        /// Step in seconds; derived from `step_count` if omitted
        #[arg(long)]
        step: Option<f64>,
        #[arg(long)]
        step_count: Option<u32>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let output = match cli.command {
        Command::Parse { mode, convert, file } => {
            let start_time = std::time::Instant::now();
            let resp = promresp_cli::read_response(file.as_deref())?;
            match promresp_cli::parse(&resp, mode, convert) {
                Ok(v) => {
                    tracing::info!(?mode, ?convert, "parse time: {:?}", start_time.elapsed());
                    v
                }
                Err(report) => {
                    let upstream = report
                        .downcast_ref::<promresp::Error>()
                        .is_some_and(promresp::Error::is_upstream);
                    if upstream {
                        tracing::error!("prometheus returned an error: {report}");
                        process::exit(2);
                    }
                    return Err(report);
                }
            }
        }
        Command::Query { base_url, expr, time } => {
            let arg = query::build_arg_for_query(&base_url, &expr, time)?;
            promresp_cli::request_json(&arg)
        }
        Command::QueryRange {
            base_url,
            expr,
            start,
            end,
            step,
            step_count,
        } => {
            let end = end.unwrap_or_else(|| time::OffsetDateTime::now_utc().unix_timestamp() as f64);
            let start = start.unwrap_or(end - 1800.0);
            let arg = query::build_arg_for_query_range(&base_url, &expr, start, end, step, step_count)?;
            promresp_cli::request_json(&arg)
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
