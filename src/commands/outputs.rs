use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::ResolvedOutputs;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::OutputsArgs;
use crate::ui;

const MASK: &str = "[secret]";

pub fn run(ctx: &Context, args: OutputsArgs) -> Result<()> {
    let graph = super::load_graph(ctx)?;
    let resolved = load_resolved(&args.resolved)?;
    let values = graph
        .evaluate_exports(&resolved)
        .context("Failed to evaluate stack outputs")?;

    if !ctx.quiet {
        ui::header("Stack Outputs");
    }
    for (name, value) in &values {
        let secret = graph.exports().get(name).is_some_and(|e| e.secret);
        println!();
        println!("{}", name.cyan().bold());
        println!("{}", display(value, secret, args.show_secrets));
    }
    Ok(())
}

fn load_resolved(path: &Path) -> Result<ResolvedOutputs> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read resolved outputs: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid resolved outputs: {}", path.display()))
}

/// Strings print raw so decoded documents keep their layout
fn display(value: &Value, secret: bool, show_secrets: bool) -> String {
    if secret && !show_secrets {
        return MASK.to_string();
    }
    match value {
        Value::String(s) => s.trim_end().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::names;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_display_masks_secrets() {
        let value = json!("apiVersion: v1\n");
        assert_eq!(display(&value, true, false), MASK);
        assert_eq!(display(&value, true, true), "apiVersion: v1");
        assert_eq!(display(&value, false, false), "apiVersion: v1");
        assert_eq!(display(&json!({"a": 1}), false, false), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_load_resolved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resolved.json");
        fs::write(
            &path,
            r#"{"creds": {"kubeconfigs": [{"value": "YXBpVmVyc2lvbjogdjEKa2luZDogQ29uZmlnCg=="}]}}"#,
        )
        .unwrap();
        let resolved = load_resolved(&path).unwrap();
        assert!(resolved.get(names::CREDENTIALS).is_some());

        fs::write(&path, "[1, 2").unwrap();
        let err = load_resolved(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid resolved outputs"));
    }
}
