use crate::expr::Expr;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cross-field refinement over the whole record.
///
/// The rule is violated when `condition` evaluates to `true`. Its message is
/// attached to `path`, which does not have to be one of `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CrossFieldValidation {
    pub id: String,
    pub message: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub condition: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CrossFieldValidation {
    /// Every top-level field the rule reads, declared or referenced by the condition.
    pub fn reads(&self) -> Vec<String> {
        let mut reads = self.fields.clone();
        for field in self.condition.reads() {
            if !reads.contains(&field) {
                reads.push(field);
            }
        }
        reads
    }
}
