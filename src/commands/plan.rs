use anyhow::Result;
use colored::Colorize;
use declarative::{DeclarationKind, ExecutionPlan, StackGraph};

use crate::Context;
use crate::cli::PlanArgs;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let graph = match &args.manifest {
        Some(path) => Manifest::load(path)?.into_graph()?,
        None => super::load_graph(ctx)?,
    };
    let plan = if args.teardown {
        graph
            .plan()?
            .filter_for_teardown(&graph, args.target.as_deref())?
    } else {
        graph
            .plan()?
            .filter_by_target(&graph, args.target.as_deref())?
    };

    if !ctx.quiet {
        let title = match (&args.target, args.teardown) {
            (Some(target), false) => format!("Apply Plan for {target}"),
            (Some(target), true) => format!("Teardown Plan for {target}"),
            (None, false) => "Apply Plan".to_string(),
            (None, true) => "Teardown Plan".to_string(),
        };
        ui::header(&title);
    }

    print_waves(&graph, &plan, args.teardown, ctx.verbose > 0);

    if !ctx.quiet {
        println!();
        ui::dim(&format!(
            "{} declarations in {} waves",
            plan.total(),
            plan.waves().len()
        ));
    }
    Ok(())
}

fn print_waves(graph: &StackGraph, plan: &ExecutionPlan, teardown: bool, detailed: bool) {
    let waves: Vec<_> = if teardown {
        plan.waves().iter().rev().collect()
    } else {
        plan.waves().iter().collect()
    };

    for (i, wave) in waves.into_iter().enumerate() {
        ui::section(&format!("Wave {}", i + 1));
        for name in &wave.names {
            let Some(decl) = graph.get(name) else {
                continue;
            };
            let marker = match decl.kind {
                DeclarationKind::Resource => "+".green(),
                DeclarationKind::Invoke => "?".blue(),
            };
            println!("  {} {} {}", marker, name.bold(), decl.short_type().dimmed());

            if detailed {
                let deps = decl.dependencies();
                if !deps.is_empty() {
                    let deps: Vec<&str> = deps.into_iter().collect();
                    ui::dim(&format!("    after {}", deps.join(", ")));
                }
            }
        }
    }
}
