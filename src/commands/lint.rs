use anyhow::{Result, bail};
use colored::Colorize;

use crate::Context;
use crate::cli::LintArgs;
use crate::lint::{self, Finding, Severity};
use crate::ui;

pub fn run(ctx: &Context, args: LintArgs) -> Result<()> {
    let graph = super::load_graph(ctx)?;
    let findings = lint::run(&graph);

    if findings.is_empty() {
        if !ctx.quiet {
            ui::success(&format!("{} declarations, no findings", graph.len()));
        }
        return Ok(());
    }

    let count = findings.len();
    let label = if count == 1 { "Finding" } else { "Findings" };
    ui::header(&format!("{count} {label}"));
    println!();
    for finding in &findings {
        print_finding(finding);
    }

    let errors = count_of(&findings, Severity::Error);
    let warnings = count_of(&findings, Severity::Warning);
    ui::dim(&format!("{errors} errors, {warnings} warnings"));

    if fails(&findings, args.deny_warnings) {
        bail!("lint failed with {errors} errors and {warnings} warnings");
    }
    Ok(())
}

fn print_finding(finding: &Finding) {
    let severity = match finding.severity {
        Severity::Error => finding.severity.to_string().red().bold(),
        Severity::Warning => finding.severity.to_string().yellow().bold(),
    };
    println!(
        "  {} {} {}",
        severity,
        finding.resource.bold(),
        format!("[{}]", finding.code).dimmed()
    );
    println!("      {}", finding.message);
    if let Some(fix) = &finding.fix {
        println!("      {} {}", "Fix:".cyan(), fix);
    }
    println!();
}

fn count_of(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

/// Errors always fail; warnings only with `--deny-warnings`
fn fails(findings: &[Finding], deny_warnings: bool) -> bool {
    findings
        .iter()
        .any(|f| f.severity == Severity::Error || deny_warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            code: "test",
            severity,
            resource: "r".into(),
            message: String::new(),
            fix: None,
        }
    }

    #[test]
    fn test_fails() {
        assert!(!fails(&[], true));
        assert!(!fails(&[finding(Severity::Warning)], false));
        assert!(fails(&[finding(Severity::Warning)], true));
        assert!(fails(&[finding(Severity::Error)], false));
    }
}
