use anyhow::{Context as AnyhowContext, Result};
use std::fs;

use crate::Context;
use crate::cli::RenderArgs;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context, args: RenderArgs) -> Result<()> {
    let graph = super::load_graph(ctx)?;
    let json = Manifest::from_graph(&graph).to_json()?;

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
            if !ctx.quiet {
                ui::success(&format!(
                    "Rendered {} declarations to {}",
                    graph.len(),
                    path.display()
                ));
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}
