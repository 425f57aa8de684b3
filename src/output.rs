use std::io::{self, Write};

use serde::Serialize;

use crate::canonical::CanonicalForm;
use crate::domain::{Fingerprint, JobState};
use crate::submit::{ProgressEvent, ProgressSink, SubmitPlan, SubmitResult};
use crate::validate::Notice;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub results: Vec<SubmitResult>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FingerprintReport {
    pub fingerprint: Fingerprint,
    pub canonical: CanonicalForm,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub plans: Vec<SubmitPlan>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub fingerprint: Fingerprint,
    pub state: Option<JobState>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_submit(report: &SubmitReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_fingerprint(report: &FingerprintReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_dry_run(report: &DryRunReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_status(report: &StatusReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Writes progress events to stderr.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}

pub struct HumanOutput;

impl HumanOutput {
    pub fn print_submit(report: &SubmitReport) {
        Self::print_notices(&report.notices);
        for result in &report.results {
            println!(
                "{} {} [{}] -> {}",
                action_label(result),
                result.job.id,
                result.job.state,
                result.target
            );
        }
    }

    pub fn print_fingerprint(report: &FingerprintReport) {
        Self::print_notices(&report.notices);
        println!("{}", report.fingerprint);
        if let Ok(bytes) = report.canonical.to_bytes() {
            println!("{}", String::from_utf8_lossy(&bytes));
        }
    }

    pub fn print_dry_run(report: &DryRunReport) {
        Self::print_notices(&report.notices);
        for plan in &report.plans {
            println!(
                "would submit {} ({}) -> {}",
                plan.fingerprint, plan.payload.name, plan.payload.target
            );
        }
    }

    pub fn print_status(report: &StatusReport) {
        match report.state {
            Some(state) => println!("{} {state}", report.fingerprint),
            None => println!("{} absent", report.fingerprint),
        }
    }

    fn print_notices(notices: &[Notice]) {
        for notice in notices {
            eprintln!("warning: {notice}");
        }
    }
}

fn action_label(result: &SubmitResult) -> &'static str {
    match result.action {
        crate::submit::SubmitAction::Reused => "reused",
        crate::submit::SubmitAction::Enqueued => "enqueued",
        crate::submit::SubmitAction::Replaced => "replaced",
    }
}
