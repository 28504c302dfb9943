//! marathon-app - Entry Point
//!
//! Reconciles one Marathon app against the declaration in a JSON parameters
//! file and prints the result as a single JSON line on stdout.
//!
//! ```text
//! marathon-app <params.json> [--host=URL] [--log-level=LEVEL] [--json-logs] [--inspect]
//! marathon-app --version
//! ```

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};

use marathon_reconciler::app::inspect::inspect;
use marathon_reconciler::app::options::AppOptions;
use marathon_reconciler::app::run::run_module;
use marathon_reconciler::config::ModuleParams;
use marathon_reconciler::errors::ReconcileError;
use marathon_reconciler::logs::{init_logging, LogLevel};
use marathon_reconciler::report::{JsonReportSink, ReportSink};
use marathon_reconciler::store::MarathonClient;
use marathon_reconciler::utils::version_info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (cli_args, positional) = parse_args(env::args().skip(1));

    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("{}", e),
        }
        return ExitCode::SUCCESS;
    }

    let mut sink = JsonReportSink::stdout();

    let params = match load(&cli_args, &positional).await {
        Ok(params) => params,
        Err(e) => return report_failure(&mut sink, e),
    };

    let mut options = AppOptions::from_params(&params);
    options.log.json_format = cli_args.contains_key("json-logs");
    if let Err(e) = init_logging(&options.log) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if cli_args.contains_key("inspect") {
        return run_inspect(&params, &options).await;
    }

    match run_module(&params, &mut sink).await {
        Ok(outcome) => {
            info!(
                "Finished {} in phase {:?}, changed: {}",
                params.name, outcome.phase, outcome.changed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to reconcile {}: {}", params.name, e);
            ExitCode::FAILURE
        }
    }
}

/// Split arguments into `--flag[=value]` options and positionals.
///
/// `--host=URL`, `--log-level=LEVEL` and `--params=PATH` carry values;
/// `--inspect`, `--json-logs` and `--version` are switches stored as "true".
fn parse_args(args: impl Iterator<Item = String>) -> (HashMap<String, String>, Vec<String>) {
    let mut options = HashMap::new();
    let mut positional = Vec::new();

    for arg in args {
        let Some(flag) = arg.strip_prefix("--") else {
            positional.push(arg);
            continue;
        };
        let (key, value) = flag.split_once('=').unwrap_or((flag, "true"));
        options.insert(key.to_string(), value.to_string());
    }

    (options, positional)
}

/// Load the parameters file and apply command line overrides
async fn load(
    cli_args: &HashMap<String, String>,
    positional: &[String],
) -> Result<ModuleParams, ReconcileError> {
    let path = cli_args
        .get("params")
        .or_else(|| positional.first())
        .ok_or_else(|| {
            ReconcileError::ConfigError("usage: marathon-app <params.json>".to_string())
        })?;

    let mut params = read_params(path)
        .await
        .map_err(|e| ReconcileError::ConfigError(format!("{e:#}")))?;

    if let Some(host) = cli_args.get("host") {
        params.host = host.clone();
    }
    if let Some(level) = cli_args.get("log-level") {
        params.log_level = level.parse::<LogLevel>().map_err(ReconcileError::ConfigError)?;
    }

    Ok(params)
}

async fn read_params(path: &str) -> anyhow::Result<ModuleParams> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("unable to read parameters file {}", path))?;
    let params = serde_json::from_str(&contents)
        .with_context(|| format!("invalid parameters in {}", path))?;
    Ok(params)
}

async fn run_inspect(params: &ModuleParams, options: &AppOptions) -> ExitCode {
    let result = async {
        let client = MarathonClient::new(&options.marathon_url, options.request_timeout)?;
        let inspection = inspect(&client, &params.name).await?;
        Ok::<_, ReconcileError>(serde_json::to_string(&inspection)?)
    }
    .await;

    match result {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to inspect {}: {}", params.name, e);
            report_failure(&mut JsonReportSink::stdout(), e)
        }
    }
}

fn report_failure(sink: &mut dyn ReportSink, err: ReconcileError) -> ExitCode {
    if let Err(e) = sink.fail(&err.to_string()) {
        eprintln!("Failed to write report: {e}");
    }
    ExitCode::FAILURE
}
