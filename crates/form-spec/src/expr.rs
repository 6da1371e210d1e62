use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Condition AST used for `active_if` and cross-field validations.
///
/// Paths are dotted field paths into the record values, e.g. `method` or
/// `bankReferences.0.phone`. A path that is not present reads as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: Value },
    Field { path: String },
    Filled { path: String },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
    Eq { left: Box<Expr>, right: Box<Expr> },
    Ne { left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    pub fn field(path: &str) -> Self {
        Expr::Field { path: path.into() }
    }

    pub fn filled(path: &str) -> Self {
        Expr::Filled { path: path.into() }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    /// `path == value`
    pub fn equals(path: &str, value: impl Into<Value>) -> Self {
        Expr::Eq {
            left: Box::new(Self::field(path)),
            right: Box::new(Self::literal(value)),
        }
    }

    pub fn all(expressions: Vec<Expr>) -> Self {
        Expr::And { expressions }
    }

    pub fn any(expressions: Vec<Expr>) -> Self {
        Expr::Or { expressions }
    }

    pub fn negate(expression: Expr) -> Self {
        Expr::Not {
            expression: Box::new(expression),
        }
    }

    /// Evaluates the expression and returns a JSON value when possible.
    pub fn evaluate_value(&self, values: &Map<String, Value>) -> Option<Value> {
        match self {
            Expr::Literal { value } => Some(value.clone()),
            Expr::Field { path } => Some(lookup(values, path).cloned().unwrap_or(Value::Null)),
            Expr::Filled { path } => Some(Value::Bool(lookup(values, path).is_some_and(is_filled))),
            Expr::And { expressions } => Self::evaluate_and(expressions, values),
            Expr::Or { expressions } => Self::evaluate_or(expressions, values),
            Expr::Not { expression } => expression
                .evaluate_bool(values)
                .map(|value| Value::Bool(!value)),
            Expr::Eq { left, right } => {
                let left_value = left.evaluate_value(values)?;
                let right_value = right.evaluate_value(values)?;
                Some(Value::Bool(left_value == right_value))
            }
            Expr::Ne { left, right } => {
                let left_value = left.evaluate_value(values)?;
                let right_value = right.evaluate_value(values)?;
                Some(Value::Bool(left_value != right_value))
            }
        }
    }

    /// Evaluates the expression and coerces the result into a boolean when possible.
    pub fn evaluate_bool(&self, values: &Map<String, Value>) -> Option<bool> {
        match self.evaluate_value(values)? {
            Value::Bool(value) => Some(value),
            Value::Null => Some(false),
            Value::String(text) => match text.to_lowercase().as_str() {
                "true" | "on" | "yes" => Some(true),
                "false" | "off" | "no" | "" => Some(false),
                _ => None,
            },
            Value::Number(number) => number.as_f64().map(|value| value != 0.0),
            _ => None,
        }
    }

    /// Top-level field ids referenced by the expression, in first-seen order.
    pub fn reads(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads(&self, out: &mut Vec<String>) {
        match self {
            Expr::Literal { .. } => {}
            Expr::Field { path } | Expr::Filled { path } => {
                let root = crate::spec::form::root_segment(path).to_string();
                if !out.contains(&root) {
                    out.push(root);
                }
            }
            Expr::And { expressions } | Expr::Or { expressions } => {
                for expression in expressions {
                    expression.collect_reads(out);
                }
            }
            Expr::Not { expression } => expression.collect_reads(out),
            Expr::Eq { left, right } | Expr::Ne { left, right } => {
                left.collect_reads(out);
                right.collect_reads(out);
            }
        }
    }

    fn evaluate_and(expressions: &[Expr], values: &Map<String, Value>) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(values) {
                Some(false) => return Some(Value::Bool(false)),
                Some(true) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(true))
        }
    }

    fn evaluate_or(expressions: &[Expr], values: &Map<String, Value>) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(values) {
                Some(true) => return Some(Value::Bool(true)),
                Some(false) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(false))
        }
    }
}

/// Resolves a dotted path, indexing arrays by numeric segments.
pub fn lookup<'a>(values: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let mut current = values.get(segments.next()?)?;
    for segment in segments {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(segment)?,
        };
    }
    Some(current)
}

/// A value counts as filled when it carries user input: not null, not a
/// blank string, not an empty array.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
