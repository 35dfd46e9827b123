//! price-cache — answer one property-price query through the cache-aside core
//!
//! Usage:
//!   price-cache predict [<json>|-]      Validate, predict, print status and body
//!   price-cache key [<json>|-]          Print the cache key for a request
//!   price-cache invalidate [<json>|-]   Remove a request's cached prediction
//!
//! The request is read from the argument, or from stdin when it is `-` or missing.
//! Logs go to stderr; `RUST_LOG` overrides the level.

use anyhow::Context;
use price_cache::{ApiReply, PredictionRequest, ServiceConfig};
use std::io::Read;
use std::process::ExitCode;

fn print_usage() {
    println!(
        r#"price-cache — cache-aside property price predictions

USAGE:
    price-cache <COMMAND> [<json>|-]

COMMANDS:
    predict       Validate the request and print the prediction reply
    key           Print the cache key derived from the request
    invalidate    Delete the cached prediction for the request
    help          Show this help message

ENVIRONMENT:
    ML_SERVICE_URL              Inference service base URL
    REDIS_URL                   Redis connection URL
    PREDICTION_CACHE_BACKEND    redis | memory | none
    PREDICTION_CACHE_TTL_SECS   Expiry of cached predictions
    APP_ENV                     "development" lowers the default log level to debug"#
    );
}

fn init_tracing() {
    let default_level = if std::env::var("APP_ENV").ok().as_deref() == Some("development") {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_request(arg: Option<&str>) -> anyhow::Result<PredictionRequest> {
    let raw = match arg {
        Some(json) if json != "-" => json.to_string(),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("request is not a valid prediction JSON object")
}

fn print_reply(reply: &ApiReply) -> ExitCode {
    println!("{}", reply.status);
    println!("{}", reply.body);
    if reply.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn cmd_predict(config: &ServiceConfig, arg: Option<&str>) -> anyhow::Result<ExitCode> {
    let request = read_request(arg)?;
    if let Err(e) = request.validate() {
        return Ok(print_reply(&ApiReply::validation(&e)));
    }
    let orchestrator = config.build_orchestrator()?;
    let reply = ApiReply::from_result(orchestrator.orchestrate(&request).await);
    let stats = orchestrator.cache().stats();
    tracing::debug!(
        backend = orchestrator.cache().backend_name(),
        hits = stats.hits,
        misses = stats.misses,
        errors = stats.errors,
        "cache stats"
    );
    Ok(print_reply(&reply))
}

fn cmd_key(config: &ServiceConfig, arg: Option<&str>) -> anyhow::Result<ExitCode> {
    let request = read_request(arg)?;
    let orchestrator = config.build_orchestrator()?;
    let key = orchestrator.key_builder().build(&request);
    println!("{}:{}", config.cache_prefix, key);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_invalidate(config: &ServiceConfig, arg: Option<&str>) -> anyhow::Result<ExitCode> {
    let request = read_request(arg)?;
    let orchestrator = config.build_orchestrator()?;
    let key = orchestrator.key_builder().build(&request);
    let removed = orchestrator.cache().delete(&key).await;
    println!("{}", if removed { "removed" } else { "not cached" });
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(ExitCode::FAILURE);
    };
    let arg = args.get(2).map(String::as_str);

    let config = ServiceConfig::from_env()?;
    match command.as_str() {
        "predict" => cmd_predict(&config, arg).await,
        "key" => cmd_key(&config, arg),
        "invalidate" => cmd_invalidate(&config, arg).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            Ok(ExitCode::FAILURE)
        }
    }
}
