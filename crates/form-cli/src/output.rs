use std::io::{self, Write};

use anyhow::Result;
use form_flow::{DriverOutcome, DriverRun, StepView};
use form_spec::ValidationReport;
use serde::Serialize;

use crate::config::OutputFormat;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub fn print_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(report);
    }
    if report.valid {
        println!("valid");
    } else {
        for error in &report.errors {
            println!("{}: {}", error.path, error.message);
        }
    }
    Ok(())
}

pub fn print_run(run: &DriverRun, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(run);
    }
    match &run.outcome {
        DriverOutcome::Submitted { receipt } => {
            println!("submitted: {}", receipt.reference);
            if let Some(message) = &receipt.message {
                println!("{message}");
            }
            print_summary(&run.view);
        }
        DriverOutcome::Blocked {
            step,
            step_id,
            errors,
        } => {
            println!("blocked at step {step} ({step_id})");
            for error in errors {
                println!("  {}: {}", error.path, error.message);
            }
        }
        DriverOutcome::Rejected { report } => {
            println!("rejected");
            for error in &report.errors {
                println!("  {}: {}", error.path, error.message);
            }
        }
    }
    Ok(())
}

fn print_summary(view: &StepView) {
    for line in &view.summary {
        println!("  {}: {}", line.label, line.value);
    }
}
