//! Evaluation of deferred inputs against engine-resolved outputs

use crate::error::{Error, Result};
use crate::types::{Input, OutputRef, json_type};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Output values reported by the engine, keyed by resource name
///
/// Each entry is the JSON object of that resource's outputs, for example
/// `{"creds": {"kubeconfigs": [{"name": "clusterUser", "value": "..."}]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedOutputs {
    values: BTreeMap<String, Value>,
}

impl ResolvedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: impl Into<String>, outputs: Value) {
        self.values.insert(resource.into(), outputs);
    }

    pub fn get(&self, resource: &str) -> Option<&Value> {
        self.values.get(resource)
    }

    /// Read the value an output reference points at
    pub fn lookup(&self, output: &OutputRef) -> Result<&Value> {
        let root = self.get(&output.resource).ok_or_else(|| Error::Unresolved {
            resource: output.resource.clone(),
        })?;
        select(root, &output.path).ok_or_else(|| Error::MissingOutput {
            resource: output.resource.clone(),
            path: output.path.clone(),
        })
    }
}

/// Resolve an input to a concrete value
pub fn evaluate(input: &Input, resolved: &ResolvedOutputs) -> Result<Value> {
    match input {
        Input::Literal { value } => Ok(value.clone()),
        Input::Output(output) => resolved.lookup(output).cloned(),
        Input::Concat { parts } => {
            let mut out = String::new();
            for part in parts {
                match evaluate(part, resolved)? {
                    Value::String(s) => out.push_str(&s),
                    Value::Number(n) => out.push_str(&n.to_string()),
                    Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                    other => {
                        return Err(Error::TransformType {
                            transform: "concat",
                            expected: "strings or scalars",
                            found: json_type(&other),
                        });
                    }
                }
            }
            Ok(Value::String(out))
        }
        Input::Apply { source, transform } => transform.apply(evaluate(source, resolved)?),
        Input::Object { fields } => fields
            .iter()
            .map(|(k, v)| Ok((k.clone(), evaluate(v, resolved)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Input::List { items } => items
            .iter()
            .map(|i| evaluate(i, resolved))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}

/// Walk a path such as `kubeconfigs[0].value` into a JSON value
fn select<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        let (field, indices) = match segment.find('[') {
            Some(at) => segment.split_at(at),
            None => (segment, ""),
        };
        if !field.is_empty() {
            current = current.get(field)?;
        }
        for index in indices.split('[').skip(1) {
            let index: usize = index.strip_suffix(']')?.parse().ok()?;
            current = current.get(index)?;
        }
    }
    Some(current)
}
