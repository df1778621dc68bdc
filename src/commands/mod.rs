use anyhow::Result;
use declarative::StackGraph;

use crate::Context;
use crate::config::StackConfig;
use crate::program;

pub mod config;
pub mod lint;
pub mod outputs;
pub mod plan;
pub mod render;

/// Load configuration and declare the stack
pub fn load_graph(ctx: &Context) -> Result<StackGraph> {
    let config = StackConfig::load(ctx.config.as_deref())?;
    program::declare(&config)
}
