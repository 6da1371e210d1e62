use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Args;
use form_flow::{FormSession, fill_answers};
use form_spec::{validate_fields, validate_record};

use crate::cli::Context;
use crate::cmd::{country, load_answers, load_form};
use crate::output::print_report;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Form id, e.g. `checkout` or `loan`
    #[arg(value_name = "FORM")]
    pub form: String,
    /// JSON object of answers keyed by field id
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    /// Only validate the fields owned by this step (1-based)
    #[arg(long, value_name = "N")]
    pub step: Option<usize>,
    /// Country used to complete local phone numbers
    #[arg(long, value_name = "ISO")]
    pub country: Option<String>,
}

/// Types the answers into a fresh session, then validates the record. Exits
/// with an error when anything fails.
pub fn run(args: &ValidateArgs, ctx: &Context) -> Result<()> {
    let spec = load_form(&args.form)?;
    let answers = load_answers(&args.answers)?;
    let mut session = FormSession::new(spec, country(args.country.as_deref(), ctx)?)?;
    fill_answers(&mut session, &answers)
        .with_context(|| format!("cannot apply {}", args.answers.display()))?;

    let report = match args.step {
        Some(index) => {
            let step = spec.step(index).ok_or_else(|| {
                anyhow!(
                    "form '{}' has {} steps, no step {index}",
                    spec.id,
                    spec.step_count()
                )
            })?;
            validate_fields(spec, &step.fields, session.record()).report(spec)
        }
        None => validate_record(spec, session.record()),
    };

    print_report(&report, ctx.format)?;
    if !report.valid {
        bail!("{} validation error(s)", report.errors.len());
    }
    Ok(())
}
