use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::config::{self, ENV_CONFIG_FILE, StackConfig};
use crate::paths;
use crate::program;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => path(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let config = StackConfig::load(ctx.config.as_deref())?;
    let effective = config.effective();

    ui::header("Stack Configuration");
    println!();
    ui::kv("managedClusterName", config.managed_cluster_name());
    ui::kv(
        "location",
        config.location.as_deref().unwrap_or("(provider default)"),
    );
    ui::kv(
        "bindGeneratedPassword",
        &config.bind_generated_password.to_string(),
    );
    ui::kv("paths.module", &config.module_dir().display().to_string());
    ui::kv(
        "runbook",
        &program::runbook_script_path(&config).display().to_string(),
    );

    if ctx.verbose > 0 {
        ui::section("As TOML");
        let toml = toml::to_string_pretty(&effective).context("Failed to serialize config")?;
        for line in toml.lines() {
            ui::dim(line);
        }
    }
    Ok(())
}

fn path(ctx: &Context) -> Result<()> {
    ui::header("Configuration Files");
    println!();
    ui::kv("Config directory", &paths::config_dir()?.display().to_string());

    match config::locate(ctx.config.as_deref())? {
        Some(file) if file.exists() => ui::kv("Config file", &file.display().to_string()),
        Some(file) => ui::warn(&format!("Config file not found: {}", file.display())),
        None => ui::dim("No stack.toml or stack.json, using defaults"),
    }

    println!();
    ui::dim(&format!(
        "Override with --config or {ENV_CONFIG_FILE}, or set {} to move the directory.",
        paths::ENV_CONFIG_DIR
    ));
    Ok(())
}
