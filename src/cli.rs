use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ENV_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "aks-stack")]
#[command(version)]
#[command(about = "Declare an AKS cluster stack and render it for a deployment engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Stack config file (stack.toml or stack.json)
    #[arg(short, long, global = true, env = ENV_CONFIG_FILE)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the apply order as waves of independent declarations
    Plan(PlanArgs),

    /// Write the manifest handed to the deployment engine
    Render(RenderArgs),

    /// Run static checks over the declared stack
    Lint(LintArgs),

    /// Evaluate stack exports against engine-resolved outputs
    Outputs(OutputsArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan
// ============================================================================

#[derive(Parser)]
pub struct PlanArgs {
    /// Only plan this declaration and what it depends on
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show teardown (reverse) order
    #[arg(long)]
    pub teardown: bool,

    /// Plan a rendered manifest instead of the built-in stack
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}

// ============================================================================
// Render
// ============================================================================

#[derive(Parser)]
pub struct RenderArgs {
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ============================================================================
// Lint
// ============================================================================

#[derive(Parser)]
pub struct LintArgs {
    /// Fail on warnings as well as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Parser)]
pub struct OutputsArgs {
    /// JSON file of resolved outputs keyed by resource name
    #[arg(short, long)]
    pub resolved: PathBuf,

    /// Print secret exports instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration after defaults
    Show,

    /// Show where configuration is read from
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_flags() {
        let cli = Cli::try_parse_from(["aks-stack", "-vv", "plan", "--target", "creds", "--teardown"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.target.as_deref(), Some("creds"));
        assert!(args.teardown);
        assert!(args.manifest.is_none());
    }

    #[test]
    fn test_outputs_requires_resolved_file() {
        assert!(Cli::try_parse_from(["aks-stack", "outputs"]).is_err());
        let cli =
            Cli::try_parse_from(["aks-stack", "outputs", "--resolved", "out.json"]).unwrap();
        assert!(matches!(cli.command, Command::Outputs(ref a) if !a.show_secrets));
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["aks-stack", "lint", "-c", "dev/stack.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("dev/stack.toml")));
    }
}
