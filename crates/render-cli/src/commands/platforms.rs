//! Platforms command - print the capability table

use anyhow::{Context, Result};
use render_build::{CapabilityTable, PlatformCapabilities};
use render_config::ConfigLoader;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Platforms command arguments
#[derive(Debug, Default)]
pub struct PlatformsArgs {
    /// Apply overrides from the manifest found here
    pub project_dir: Option<PathBuf>,
    /// JSON output
    pub json: bool,
}

/// Run the platforms command
pub fn run(args: PlatformsArgs) -> Result<()> {
    let project_dir = super::absolute_dir(args.project_dir.as_deref())?;
    let config = ConfigLoader::new()
        .load_from_directory(&project_dir)
        .context("Failed to load rendergen.toml")?;
    let table = CapabilityTable::with_overrides(&config.project.platforms)?;

    if args.json {
        let rows: BTreeMap<&str, &PlatformCapabilities> =
            table.iter().map(|(p, row)| (p.name(), row)).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for (platform, row) in table.iter() {
        println!("{}", platform);
        println!("  backends:   {}", join(row.backends.iter().map(|b| b.name())));
        println!("  frameworks: {}", join(row.frameworks.iter().map(String::as_str)));
        println!("  libs:       {}", join(row.libs.iter().map(String::as_str)));
        match row.resource_set {
            Some(kind) if row.has_bundles() => println!(
                "  bundle:     {} ({})",
                row.bundle.extension().unwrap_or("-"),
                kind
            ),
            _ => println!("  bundle:     -"),
        }
        println!(
            "  monolithic: {}, tools: {}",
            yes_no(row.monolithic),
            yes_no(row.host_tools)
        );
    }

    Ok(())
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
