//! Core types for declarative resource graphs

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Property inputs of a declaration, keyed by provider property name
pub type Inputs = BTreeMap<String, Input>;

/// Reference to an output of another declaration
///
/// `path` addresses a property of the resolved value using dots for fields
/// and brackets for list indices, e.g. `identity.principalId` or
/// `kubeconfigs[0].value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub resource: String,
    pub path: String,
}

impl OutputRef {
    pub fn new(resource: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            path: path.into(),
        }
    }

    /// Top-level property name (`identity` for `identity.principalId`)
    pub fn property(&self) -> &str {
        self.path
            .split(['.', '['])
            .next()
            .unwrap_or(self.path.as_str())
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.resource, self.path)
    }
}

/// Transform applied to a value once it is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Decode a standard base64 string into UTF-8 text
    Base64Decode,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base64Decode => "base64_decode",
        }
    }

    /// Run the transform over a resolved value
    pub fn apply(&self, value: Value) -> Result<Value> {
        match self {
            Self::Base64Decode => {
                let Value::String(encoded) = value else {
                    return Err(Error::TransformType {
                        transform: self.name(),
                        expected: "a string",
                        found: json_type(&value),
                    });
                };
                // Providers may line-wrap long blobs
                let compact: String = encoded
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                let bytes = general_purpose::STANDARD.decode(compact)?;
                Ok(Value::String(String::from_utf8(bytes)?))
            }
        }
    }
}

/// A value fed into a declaration property
///
/// Anything other than `Literal` may depend on outputs that only exist once
/// the referenced resource has been provisioned. Every `Output` reachable from
/// an input is a dependency edge in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
    /// Value known at declaration time
    Literal { value: Value },
    /// Output of another declaration
    Output(OutputRef),
    /// String concatenation of the parts
    Concat { parts: Vec<Input> },
    /// Transform over another input
    Apply {
        source: Box<Input>,
        transform: Transform,
    },
    /// Object whose fields may themselves be deferred
    Object { fields: BTreeMap<String, Input> },
    /// List whose items may themselves be deferred
    List { items: Vec<Input> },
}

impl Input {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn output(resource: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Output(OutputRef::new(resource, path))
    }

    pub fn concat(parts: impl IntoIterator<Item = Input>) -> Self {
        Self::Concat {
            parts: parts.into_iter().collect(),
        }
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Input)>) -> Self {
        Self::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn list(items: impl IntoIterator<Item = Input>) -> Self {
        Self::List {
            items: items.into_iter().collect(),
        }
    }

    /// Wrap this input in a deferred transform
    pub fn apply(self, transform: Transform) -> Self {
        Self::Apply {
            source: Box::new(self),
            transform,
        }
    }

    /// All output references reachable from this input
    pub fn references(&self) -> Vec<&OutputRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a OutputRef>) {
        match self {
            Self::Literal { .. } => {}
            Self::Output(r) => refs.push(r),
            Self::Concat { parts } | Self::List { items: parts } => {
                for part in parts {
                    part.collect_references(refs);
                }
            }
            Self::Apply { source, .. } => source.collect_references(refs),
            Self::Object { fields } => {
                for value in fields.values() {
                    value.collect_references(refs);
                }
            }
        }
    }

    /// The literal value, if this input is a plain literal
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Whether the input is known without any provisioning
    pub fn is_known(&self) -> bool {
        self.references().is_empty()
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Self::literal(value)
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Self::literal(value)
    }
}

impl From<u32> for Input {
    fn from(value: u32) -> Self {
        Self::literal(value)
    }
}

impl From<OutputRef> for Input {
    fn from(value: OutputRef) -> Self {
        Self::Output(value)
    }
}

/// Symbolic rendering, with `${resource.path}` standing in for outputs
impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal {
                value: Value::String(s),
            } => f.write_str(s),
            Self::Literal { value } => write!(f, "{value}"),
            Self::Output(r) => write!(f, "{r}"),
            Self::Concat { parts } => parts.iter().try_for_each(|p| write!(f, "{p}")),
            Self::Apply { source, transform } => write!(f, "{}({source})", transform.name()),
            Self::Object { fields } => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::List { items } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_references_walk_nested_inputs() {
        let input = Input::object([
            ("clientId", Input::output("aks", "clientId")),
            (
                "keys",
                Input::list([Input::object([(
                    "keyData",
                    Input::output("ssh-key", "publicKeyOpenssh"),
                )])]),
            ),
            ("prefix", Input::concat(["MC_".into(), Input::output("k8s", "name")])),
            ("plain", Input::literal(3)),
        ]);

        let mut names: Vec<&str> = input
            .references()
            .iter()
            .map(|r| r.resource.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["aks", "k8s", "ssh-key"]);
        assert!(!input.is_known());
        assert!(Input::literal("x").is_known());
    }

    #[test]
    fn test_display_renders_symbolically() {
        let scope = Input::concat([
            "/subscriptions/".into(),
            Input::output("client-config", "subscriptionId"),
        ]);
        assert_eq!(
            scope.to_string(),
            "/subscriptions/${client-config.subscriptionId}"
        );

        let decoded = Input::output("creds", "kubeconfigs[0].value").apply(Transform::Base64Decode);
        assert_eq!(
            decoded.to_string(),
            "base64_decode(${creds.kubeconfigs[0].value})"
        );
    }

    #[test]
    fn test_output_ref_property() {
        assert_eq!(OutputRef::new("acct", "identity.principalId").property(), "identity");
        assert_eq!(OutputRef::new("creds", "kubeconfigs[0].value").property(), "kubeconfigs");
        assert_eq!(OutputRef::new("pw", "result").property(), "result");
    }

    #[test]
    fn test_base64_decode_transform() {
        let decoded = Transform::Base64Decode
            .apply(json!("aGVsbG8gd29ybGQ="))
            .unwrap();
        assert_eq!(decoded, json!("hello world"));
    }

    #[test]
    fn test_base64_decode_ignores_line_wrapping() {
        let decoded = Transform::Base64Decode
            .apply(json!("YXBpVmVyc2lvbjog\ndjEKa2luZDogQ29uZmlnCg==\r\n"))
            .unwrap();
        assert_eq!(decoded, json!("apiVersion: v1\nkind: Config\n"));
    }

    #[test]
    fn test_base64_decode_rejects_non_strings() {
        let err = Transform::Base64Decode.apply(json!(42)).unwrap_err();
        assert!(matches!(err, Error::TransformType { found: "a number", .. }));
    }

    #[test]
    fn test_input_serializes_with_kind_tag() {
        let input = Input::output("k8s", "name");
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({"kind": "output", "resource": "k8s", "path": "name"})
        );
        let back: Input = serde_json::from_value(value).unwrap();
        assert_eq!(back, input);
    }
}
