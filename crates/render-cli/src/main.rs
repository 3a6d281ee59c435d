use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use render_build::OutputFormat;
use std::path::PathBuf;

mod commands;

/// Build graph planner for the render library.
///
/// Reads rendergen.toml, resolves the target platform's capabilities and
/// writes a Ninja (or JSON) build file covering the render library, its
/// developer tools and its test suite.
///
/// EXAMPLES:
///     rendergen configure                      Configure for the host
///     rendergen configure --target ios         Configure for iOS
///     rendergen plan --target windows          Show the build order
///     rendergen platforms                      Show the capability table
///
/// ENVIRONMENT VARIABLES:
///     RENDER_CONFIGS               Comma-separated configuration list
///     RENDER_TOOLCHAIN_MONOLITHIC  Set to '1' to aggregate tests on every platform
///     VULKAN_SDK                   Vulkan SDK root (adds include and lib paths)
///     RUST_LOG                     Log filter (e.g. 'debug')
#[derive(Parser)]
#[command(name = "rendergen")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Ninja,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Ninja => OutputFormat::Ninja,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the project and write the build file
    ///
    /// Resolves the target, plans the library, tools and tests, and writes
    /// the build file atomically. Nothing is written if planning fails, and
    /// an unchanged build file is left untouched.
    ///
    /// EXAMPLES:
    ///     rendergen configure                          Host target, build.ninja
    ///     rendergen configure --target android         Monolithic test bundle
    ///     rendergen configure --configs debug,release  Only two configurations
    ///     rendergen configure --nested                 Libraries only
    ///     rendergen configure --format json -o plan.json
    #[command(visible_alias = "c")]
    Configure {
        /// Target platform (macos, ios, android, windows, linux, tizen, pnacl)
        #[arg(long, short = 't')]
        target: Option<String>,
        /// Aggregate all tests into one binary on every platform
        #[arg(long)]
        monolithic: bool,
        /// Comma-separated build configurations
        #[arg(long)]
        configs: Option<String>,
        /// Configure as part of a parent build (no tests or tools)
        #[arg(long)]
        nested: bool,
        /// Output file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Build file format
        #[arg(long, value_enum, default_value = "ninja")]
        format: Format,
        /// Project directory
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Print the ordered artifact list and build levels
    ///
    /// EXAMPLES:
    ///     rendergen plan                       Plan for the host
    ///     rendergen plan --target ios --json   Machine-readable plan
    #[command(visible_alias = "p")]
    Plan {
        /// Target platform
        #[arg(long, short = 't')]
        target: Option<String>,
        /// Aggregate all tests into one binary on every platform
        #[arg(long)]
        monolithic: bool,
        /// Comma-separated build configurations
        #[arg(long)]
        configs: Option<String>,
        /// Plan as part of a parent build (no tests or tools)
        #[arg(long)]
        nested: bool,
        /// Project directory
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Print the platform capability table
    ///
    /// Overrides from the [platforms] section of rendergen.toml are applied
    /// when a manifest is found.
    Platforms {
        /// Project directory
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Configure {
            target,
            monolithic,
            configs,
            nested,
            output,
            format,
            project_dir,
            json,
        } => {
            let args = commands::configure::ConfigureArgs {
                target: commands::TargetOptions {
                    target,
                    monolithic,
                    configs,
                    nested,
                    project_dir,
                },
                output,
                format: format.into(),
                json,
            };
            commands::configure::run(args)?;
        }
        Commands::Plan {
            target,
            monolithic,
            configs,
            nested,
            project_dir,
            json,
        } => {
            let args = commands::plan::PlanArgs {
                target: commands::TargetOptions {
                    target,
                    monolithic,
                    configs,
                    nested,
                    project_dir,
                },
                json,
            };
            commands::plan::run(args)?;
        }
        Commands::Platforms { project_dir, json } => {
            commands::platforms::run(commands::platforms::PlatformsArgs { project_dir, json })?;
        }
    }

    Ok(())
}
