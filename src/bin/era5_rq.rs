use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use era5_requests::canonical::CanonicalForm;
use era5_requests::config::{ConfigLoader, ResolvedConfig, ResolvedRequest, default_broker_url};
use era5_requests::domain::{Dataset, Fingerprint};
use era5_requests::error::Era5Error;
use era5_requests::output::{
    DryRunReport, FingerprintReport, HumanOutput, JsonOutput, OutputMode, StatusReport,
    StderrProgress, SubmitReport,
};
use era5_requests::redis_broker::RedisBroker;
use era5_requests::request::{RawRequest, RequestSpec};
use era5_requests::submit::{ProgressSink, SubmitPlan, SubmitSettings, Submitter};

#[derive(Parser)]
#[command(name = "era5-rq")]
#[command(about = "Submit ERA5 retrieval requests to the shared download queue, once per distinct request")]
#[command(version)]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Submit a request from flags, or every request in the config file")]
    Submit(SubmitArgs),
    #[command(about = "Print the canonical form and fingerprint of a request")]
    Fingerprint(RequestArgs),
    #[command(about = "Show the broker state of a job")]
    Status(StatusArgs),
}

#[derive(Args, Clone)]
struct RequestArgs {
    #[arg(long, value_enum, default_value_t = Dataset::PressureLevels)]
    dataset: Dataset,

    #[arg(long, value_delimiter = ',')]
    variable: Vec<String>,

    #[arg(long, num_args = 2, allow_negative_numbers = true, value_names = ["A", "B"])]
    lat: Option<Vec<f64>>,

    #[arg(long, num_args = 2, allow_negative_numbers = true, value_names = ["A", "B"])]
    lon: Option<Vec<f64>>,

    #[arg(long, value_delimiter = ',')]
    year: Vec<i64>,

    #[arg(long, value_delimiter = ',')]
    month: Vec<i64>,

    #[arg(long, value_delimiter = ',')]
    day: Vec<i64>,

    #[arg(long, value_delimiter = ',')]
    time: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pressure_level: Vec<u32>,

    /// Output file the worker writes to.
    #[arg(long)]
    target: Option<Utf8PathBuf>,
}

#[derive(Args, Clone)]
struct SubmitArgs {
    #[command(flatten)]
    request: RequestArgs,

    #[arg(long)]
    config: Option<String>,

    /// Compute fingerprints and payloads without contacting the broker.
    #[arg(long)]
    dry_run: bool,

    /// Report submission phases on stderr.
    #[arg(long)]
    progress: bool,
}

#[derive(Args)]
struct StatusArgs {
    fingerprint: String,

    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<Era5Error>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &Era5Error) -> u8 {
    if error.is_validation() {
        2
    } else if error.is_broker() {
        3
    } else {
        1
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Commands::Submit(args) => run_submit(args, output_mode),
        Commands::Fingerprint(args) => run_fingerprint(args, output_mode),
        Commands::Status(args) => run_status(args, output_mode),
    }
}

impl RequestArgs {
    fn has_request(&self) -> bool {
        !self.variable.is_empty()
    }

    fn to_raw(&self) -> RawRequest {
        RawRequest {
            variable: self.variable.clone(),
            lat_boundary: self.lat.as_deref().and_then(pair),
            lon_boundary: self.lon.as_deref().and_then(pair),
            year: non_empty(&self.year),
            month: non_empty(&self.month),
            day: non_empty(&self.day),
            time: non_empty(&self.time),
            pressure_level: non_empty(&self.pressure_level),
        }
    }
}

fn pair(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn load_config(path: Option<&str>, required: bool) -> miette::Result<Option<ResolvedConfig>> {
    match (path, required) {
        (Some(path), _) => Ok(Some(ConfigLoader::resolve(Some(path))?)),
        (None, true) => Ok(Some(ConfigLoader::resolve(None)?)),
        (None, false) => Ok(None),
    }
}

fn broker_settings(config: Option<&ResolvedConfig>) -> (String, SubmitSettings) {
    match config {
        Some(config) => (config.broker_url.clone(), config.settings.clone()),
        None => (default_broker_url(), SubmitSettings::default()),
    }
}

fn run_submit(args: SubmitArgs, output_mode: OutputMode) -> miette::Result<()> {
    let from_flags = args.request.has_request();
    let config = load_config(args.config.as_deref(), !from_flags)?;

    let requests = if from_flags {
        let target = args
            .request
            .target
            .clone()
            .ok_or_else(|| miette::Report::msg("--target is required when submitting from flags"))?;
        vec![ResolvedRequest {
            dataset: args.request.dataset,
            target,
            raw: args.request.to_raw(),
        }]
    } else {
        config
            .as_ref()
            .map(|config| config.requests.clone())
            .unwrap_or_default()
    };

    // Validate everything before the first broker call.
    let mut notices = Vec::new();
    let mut specs = Vec::with_capacity(requests.len());
    for request in requests {
        let validated = RequestSpec::build(request.dataset, &request.raw)?;
        notices.extend(validated.notices);
        specs.push((validated.spec, request.target));
    }

    if args.dry_run {
        let plans = specs
            .iter()
            .map(|(spec, target)| SubmitPlan::new(spec, target))
            .collect::<Result<Vec<_>, Era5Error>>()?;
        let report = DryRunReport { plans, notices };
        match output_mode {
            OutputMode::Json => JsonOutput::print_dry_run(&report).into_diagnostic()?,
            OutputMode::Human => HumanOutput::print_dry_run(&report),
        }
        return Ok(());
    }

    let (url, settings) = broker_settings(config.as_ref());
    let submitter = Submitter::new(RedisBroker::new(&url)?, settings);
    let sink: &dyn ProgressSink = if args.progress {
        &StderrProgress
    } else {
        &JsonOutput
    };

    let mut results = Vec::with_capacity(specs.len());
    for (spec, target) in &specs {
        results.push(submitter.submit_or_reuse(spec, target, sink)?);
    }

    let report = SubmitReport { results, notices };
    match output_mode {
        OutputMode::Json => JsonOutput::print_submit(&report).into_diagnostic()?,
        OutputMode::Human => HumanOutput::print_submit(&report),
    }
    Ok(())
}

fn run_fingerprint(args: RequestArgs, output_mode: OutputMode) -> miette::Result<()> {
    let validated = RequestSpec::build(args.dataset, &args.to_raw())?;
    let canonical = CanonicalForm::from_spec(&validated.spec);
    let report = FingerprintReport {
        fingerprint: canonical.fingerprint()?,
        canonical,
        notices: validated.notices,
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_fingerprint(&report).into_diagnostic()?,
        OutputMode::Human => HumanOutput::print_fingerprint(&report),
    }
    Ok(())
}

fn run_status(args: StatusArgs, output_mode: OutputMode) -> miette::Result<()> {
    let fingerprint: Fingerprint = args.fingerprint.parse()?;
    let config = load_config(args.config.as_deref(), false)?;
    let (url, settings) = broker_settings(config.as_ref());
    let submitter = Submitter::new(RedisBroker::new(&url)?, settings);
    let state = submitter.status(&fingerprint)?;
    let report = StatusReport { fingerprint, state };
    match output_mode {
        OutputMode::Json => JsonOutput::print_status(&report).into_diagnostic()?,
        OutputMode::Human => HumanOutput::print_status(&report),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_negative_boundaries() {
        let cli = Cli::try_parse_from([
            "era5-rq",
            "fingerprint",
            "--variable",
            "temperature",
            "--lat",
            "-10",
            "40",
            "--year",
            "1986,1987",
        ])
        .unwrap();
        let Commands::Fingerprint(args) = cli.command else {
            panic!("expected fingerprint command");
        };
        let raw = args.to_raw();
        assert_eq!(raw.lat_boundary, Some((-10.0, 40.0)));
        assert_eq!(raw.year, Some(vec![1986, 1987]));
        assert_eq!(raw.month, None);
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(map_exit_code(&Era5Error::MissingVariable), 2);
        assert_eq!(
            map_exit_code(&Era5Error::BrokerUnavailable("down".to_string())),
            3
        );
        assert_eq!(map_exit_code(&Era5Error::MissingConfig), 1);
    }
}
