use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::app::{GazetteError, Result};

/// Named query parameters, referenced as `$name` in an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }

    /// Stable JSON text, keys sorted.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Never serve a previously cached result for this call.
    pub bypass_cache: bool,
}

impl QueryOptions {
    pub fn fresh() -> Self {
        Self { bypass_cache: true }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Names referenced as `$name` outside string literals.
fn referenced_params(expression: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut chars = expression.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '$' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !name.is_empty() {
                    names.insert(name);
                }
            }
            _ => {}
        }
    }

    names
}

/// Reject malformed requests before they reach the store.
pub fn validate(expression: &str, params: &QueryParams) -> Result<()> {
    if expression.trim().is_empty() {
        return Err(GazetteError::Query("empty query expression".into()));
    }

    if let Some(bad) = params.0.keys().find(|k| !is_identifier(k)) {
        return Err(GazetteError::Query(format!(
            "invalid parameter name: {:?}",
            bad
        )));
    }

    if let Some(missing) = referenced_params(expression)
        .into_iter()
        .find(|name| !params.0.contains_key(name))
    {
        return Err(GazetteError::Query(format!(
            "param ${} referenced, but not provided",
            missing
        )));
    }

    Ok(())
}
