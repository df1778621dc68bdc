//! Rendered stack manifest - the document handed to the engine

use anyhow::{Context, Result};
use declarative::{Declaration, Export, StackGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub project: String,
    pub resources: Vec<Declaration>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Export>,
}

impl Manifest {
    pub fn from_graph(graph: &StackGraph) -> Self {
        Self {
            version: MANIFEST_VERSION,
            project: env!("CARGO_PKG_NAME").to_string(),
            resources: graph.declarations().to_vec(),
            outputs: graph.exports().clone(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        if manifest.version != MANIFEST_VERSION {
            anyhow::bail!(
                "Unsupported manifest version {} in {}",
                manifest.version,
                path.display()
            );
        }
        Ok(manifest)
    }

    /// Rebuild and validate the graph the manifest describes
    pub fn into_graph(self) -> Result<StackGraph> {
        StackGraph::from_declarations(self.resources, self.outputs)
            .context("Manifest does not describe a valid stack")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize manifest")
    }
}
