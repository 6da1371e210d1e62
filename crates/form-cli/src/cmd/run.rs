use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use form_flow::{DriverOutcome, run_non_interactive};

use crate::cli::Context;
use crate::cmd::{country, load_answers, load_form};
use crate::output::print_run;
use crate::transport::FileTransport;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Form id, e.g. `checkout` or `loan`
    #[arg(value_name = "FORM")]
    pub form: String,
    /// JSON object of answers keyed by field id
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    /// Where the submitted record is written; stdout when omitted
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Country used to complete local phone numbers
    #[arg(long, value_name = "ISO")]
    pub country: Option<String>,
}

pub fn run(args: &RunArgs, ctx: &Context) -> Result<()> {
    let spec = load_form(&args.form)?;
    let answers = load_answers(&args.answers)?;
    let country = country(args.country.as_deref(), ctx)?;
    let transport = FileTransport::new(args.out.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run_non_interactive(spec, country, &answers, &transport))?;

    print_run(&outcome, ctx.format)?;
    match &outcome.outcome {
        DriverOutcome::Submitted { .. } => Ok(()),
        DriverOutcome::Blocked { step, .. } => bail!("form '{}' blocked at step {step}", spec.id),
        DriverOutcome::Rejected { report } => bail!(
            "form '{}' rejected with {} validation error(s)",
            spec.id,
            report.errors.len()
        ),
    }
}
