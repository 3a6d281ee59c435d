//! Configure command - plan the project and write the build file

use super::TargetOptions;
use anyhow::{Context, Result};
use render_build::OutputFormat;
use std::path::PathBuf;

/// Configure command arguments
#[derive(Debug, Default)]
pub struct ConfigureArgs {
    pub target: TargetOptions,
    /// Output file (defaults to build.ninja or build.json next to the manifest)
    pub output: Option<PathBuf>,
    /// Build file format
    pub format: OutputFormat,
    /// JSON summary on stdout
    pub json: bool,
}

/// Run the configure command
pub fn run(args: ConfigureArgs) -> Result<()> {
    let configurator = args.target.configurator()?;
    let configuration = configurator.configure().context("Configuration failed")?;
    let build_file = configuration.emit().context("Failed to emit build graph")?;

    let output = match (&args.output, configurator.project_root()) {
        (Some(output), _) => output.clone(),
        (None, Some(root)) => root.join(args.format.default_file_name()),
        (None, None) => args.target.project_dir()?.join(args.format.default_file_name()),
    };

    let written = build_file
        .write_atomic(&output, args.format)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let context = configuration.context();
    let stats = configuration.stats();

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "platform": context.target.platform().name(),
                "monolithic": context.target.is_monolithic_preferred(),
                "configs": context.toolchain.names(),
                "output": output.display().to_string(),
                "written": written,
                "fingerprint": build_file.fingerprint(),
                "artifacts": build_file.rules.len(),
                "libraries": stats.libraries,
                "tools": stats.tools,
                "tests": stats.tests,
                "edges": build_file.edges.len(),
                "exported_libraries": configuration.exported_libraries(),
            })
        );
    } else {
        println!(
            "Configured for {} [{}]",
            context.target,
            context.toolchain.names().join(", ")
        );
        println!(
            "  Artifacts: {} ({} libraries, {} tools, {} tests)",
            build_file.rules.len(),
            stats.libraries,
            stats.tools,
            stats.tests
        );
        if written {
            println!("  Wrote {}", output.display());
        } else {
            println!("  {} is up to date", output.display());
        }
    }

    Ok(())
}
