//! CLI entry point for gosuggest.
//!
//! Provides commands for writing and inspecting configuration and for checking
//! how import paths resolve against the configured GOROOT/GOPATH.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use gosuggest::{BuildContext, GoBuildContext, Settings};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(
    name = "gosuggest",
    version,
    about = "Package resolver for Go completion",
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .gosuggest/settings.toml with default values
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Config,

    /// Show where an import path resolves and whether it is a root package
    Locate {
        /// Import path, e.g. "fmt" or "github.com/user/pkg"
        import: String,

        /// Directory of the importing file
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    gosuggest::logging::init(cli.debug || settings.debug);

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force)
                .map_err(|e| anyhow::anyhow!("Failed to create configuration: {e}"))?;
            if force {
                println!("Overwrote configuration at: {}", path.display());
            } else {
                println!("Created default configuration at: {}", path.display());
            }
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        Commands::Locate { import, dir, json } => {
            let ctx = GoBuildContext::from_config(&settings.build);
            match ctx.locate(&import, &dir) {
                Ok(found) if json => println!("{}", serde_json::to_string_pretty(&found)?),
                Ok(found) => {
                    println!("import path: {}", found.import_path);
                    println!("directory:   {}", found.dir.display());
                    println!("root:        {}", found.is_root);
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    for suggestion in e.recovery_suggestions() {
                        eprintln!("  - {suggestion}");
                    }
                    if json {
                        let body = serde_json::json!({
                            "status": e.status_code(),
                            "error": e.to_string(),
                        });
                        println!("{}", serde_json::to_string_pretty(&body)?);
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
