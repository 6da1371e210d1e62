pub mod forms;
pub mod mask;
pub mod run;
pub mod schema;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use form_flow::CountryContext;
use form_spec::{FormSpec, catalog};
use serde_json::Value;

use crate::cli;

pub(crate) fn load_form(id: &str) -> Result<&'static FormSpec> {
    catalog::by_id(id).ok_or_else(|| {
        anyhow!(
            "unknown form '{id}' (available: {})",
            catalog::FORM_IDS.join(", ")
        )
    })
}

pub(crate) fn load_answers(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid answers JSON {}", path.display()))
}

/// Country from the command line when given, else the configured default.
pub(crate) fn country(flag: Option<&str>, ctx: &cli::Context) -> Result<CountryContext> {
    let iso = flag.unwrap_or(&ctx.config.default_country);
    CountryContext::new(iso).with_context(|| format!("cannot use country '{iso}'"))
}
