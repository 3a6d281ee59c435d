//! Plan command - show the ordered artifact list without writing anything

use super::TargetOptions;
use anyhow::{Context, Result};
use render_build::ArtifactSpec;

/// Plan command arguments
#[derive(Debug, Default)]
pub struct PlanArgs {
    pub target: TargetOptions,
    /// JSON output
    pub json: bool,
}

/// Run the plan command
pub fn run(args: PlanArgs) -> Result<()> {
    let configuration = args.target.configurator()?.configure().context("Configuration failed")?;
    let build_file = configuration.emit().context("Failed to order build graph")?;
    let levels = configuration.build_levels()?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "platform": build_file.platform,
                "configs": build_file.configs,
                "artifacts": build_file.rules,
                "edges": build_file.edges,
                "levels": levels,
            })
        );
        return Ok(());
    }

    println!("Build plan for {}", configuration.context().target);
    for (i, rule) in build_file.rules.iter().enumerate() {
        println!(
            "  {:>2}. {:<4} {:<16} {}",
            i + 1,
            rule.kind.rule_name(),
            rule.name,
            rule.output.display()
        );
        if let Some(artifact) = configuration.graph().get(&rule.name) {
            print_details(artifact);
        }
    }

    println!("Build levels:");
    for (i, level) in levels.iter().enumerate() {
        println!("  {}: {}", i, level.join(", "));
    }

    Ok(())
}

fn print_details(artifact: &ArtifactSpec) {
    if !artifact.implicit_deps().is_empty() {
        println!("        after: {}", artifact.implicit_deps().join(", "));
    }
    let resources = artifact.resources();
    if !resources.is_empty() {
        let names: Vec<String> = resources.iter().map(|r| r.display().to_string()).collect();
        println!("        resources: {}", names.join(", "));
    }
}
