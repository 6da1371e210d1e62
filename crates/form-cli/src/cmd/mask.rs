use anyhow::Result;
use clap::{Args, ValueEnum};
use form_spec::{InputMask, apply_mask};
use serde::Serialize;
use serde_json::Value;

use crate::cli::Context;
use crate::cmd::country;
use crate::config::OutputFormat;
use crate::output::print_json;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    CardNumber,
    Expiry,
    Numeric,
    Phone,
}

impl From<MaskKind> for InputMask {
    fn from(kind: MaskKind) -> Self {
        match kind {
            MaskKind::CardNumber => InputMask::CardNumber,
            MaskKind::Expiry => InputMask::Expiry,
            MaskKind::Numeric => InputMask::Numeric,
            MaskKind::Phone => InputMask::Phone,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MaskArgs {
    #[arg(value_enum)]
    pub kind: MaskKind,
    /// Characters typed one at a time, appended to the stored value
    #[arg(value_name = "KEYS")]
    pub keys: String,
    /// Country used to complete local phone numbers
    #[arg(long, value_name = "ISO")]
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
struct Keystroke {
    key: char,
    stored: Value,
}

/// Feeds every character through the mask as a separate change event and
/// shows what gets stored after each one.
pub fn run(args: &MaskArgs, ctx: &Context) -> Result<()> {
    let country = country(args.country.as_deref(), ctx)?;
    let calling_code = country.calling_code();
    let mask = InputMask::from(args.kind);

    let mut stored = Value::String(String::new());
    let mut strokes = Vec::new();
    for key in args.keys.chars() {
        let raw = format!("{}{key}", display(&stored));
        stored = apply_mask(mask, Some(&stored), &raw, calling_code);
        strokes.push(Keystroke {
            key,
            stored: stored.clone(),
        });
    }

    if ctx.format == OutputFormat::Json {
        return print_json(&strokes);
    }
    for stroke in &strokes {
        println!("{} -> {}", stroke.key, display(&stroke.stored));
    }
    Ok(())
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
