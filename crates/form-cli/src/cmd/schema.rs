use anyhow::{Result, bail};
use clap::Args;
use form_spec::FormSpec;

use crate::cli::Context;
use crate::cmd::load_form;
use crate::output::print_json;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Form id, e.g. `checkout` or `loan`
    #[arg(value_name = "FORM", required_unless_present = "json_schema")]
    pub form: Option<String>,
    /// Print the JSON Schema describing form definitions instead
    #[arg(long = "json-schema")]
    pub json_schema: bool,
}

/// Definitions are always printed as JSON regardless of `--format`.
pub fn run(args: &SchemaArgs, _ctx: &Context) -> Result<()> {
    if args.json_schema {
        let schema = schemars::schema_for!(FormSpec);
        return print_json(&schema);
    }
    let Some(form) = &args.form else {
        bail!("a form id is required unless --json-schema is given");
    };
    print_json(load_form(form)?)
}
