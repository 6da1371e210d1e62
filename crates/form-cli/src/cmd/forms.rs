use anyhow::Result;
use clap::Args;
use form_spec::catalog;
use serde::Serialize;

use crate::cli::Context;
use crate::config::OutputFormat;
use crate::output::print_json;

#[derive(Args, Debug, Clone)]
pub struct FormsArgs {}

#[derive(Debug, Serialize)]
struct FormSummary {
    id: String,
    title: String,
    version: String,
    steps: usize,
    fields: usize,
}

pub fn run(_args: &FormsArgs, ctx: &Context) -> Result<()> {
    let forms: Vec<FormSummary> = catalog::FORM_IDS
        .iter()
        .filter_map(|id| catalog::by_id(id))
        .map(|spec| FormSummary {
            id: spec.id.clone(),
            title: spec.title.clone(),
            version: spec.version.clone(),
            steps: spec.step_count(),
            fields: spec.fields.len(),
        })
        .collect();

    if ctx.format == OutputFormat::Json {
        return print_json(&forms);
    }
    for form in &forms {
        println!(
            "{:<10} {} (v{}, {} steps, {} fields)",
            form.id, form.title, form.version, form.steps, form.fields
        );
    }
    Ok(())
}
