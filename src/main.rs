use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use archcost::architecture::Architecture;
use archcost::catalog::AwsPriceSource;
use archcost::config::{init_config, Config};
use archcost::engine::Estimator;
use archcost::generate::generate_architecture;
use archcost::llm::ProviderChain;

#[derive(Parser)]
#[command(name = "archcost")]
#[command(
    about = "Estimate the monthly cost of an AWS architecture",
    long_about = "archcost walks an architecture description (a JSON node list) against the AWS \
Price List API and produces an hourly/monthly/yearly cost report with a per-service breakdown.\n\n\
It can also generate the architecture JSON itself by describing your requirements to an LLM \
provider (OpenAI, Gemini or Mistral, tried in configured order)."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate costs for an architecture JSON file
    Estimate {
        /// Path to the architecture JSON (must contain a top-level "nodes" list)
        file: PathBuf,
        /// Write the report as JSON to this path instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Region for nodes that do not declare one (e.g. ap-south-1)
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Generate an architecture JSON from free-form requirements
    Generate {
        /// Requirements text, or a path to a file containing it when --from-file is set
        requirements: String,
        /// Treat the requirements argument as a file path
        #[arg(long)]
        from_file: bool,
        /// Output path for the generated architecture JSON
        #[arg(short, long, default_value = "architecture.json")]
        output: PathBuf,
    },
    /// Initialize configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".archcost.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Suppress INFO by default, only show warnings and errors
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Estimate {
            file,
            output,
            region,
        } => {
            let architecture = Architecture::from_file(&file)
                .with_context(|| format!("Failed to load architecture: {}", file.display()))?;

            let default_region =
                region.unwrap_or_else(|| config.pricing.default_region.clone());
            let source = AwsPriceSource::new(config.pricing.max_results).await;
            let estimator = Estimator::new(Box::new(source), default_region);

            let report = estimator.estimate(&architecture).await;

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("Cost report written to {}", path.display());
            } else {
                println!("{}", report.render_text());
            }
        }
        Commands::Generate {
            requirements,
            from_file,
            output,
        } => {
            let requirements = if from_file {
                std::fs::read_to_string(&requirements)
                    .with_context(|| format!("Failed to read requirements: {}", requirements))?
            } else {
                requirements
            };

            let llm_config = config.llm.clone().unwrap_or_default();
            let chain = ProviderChain::from_env(&llm_config);

            let architecture = generate_architecture(&chain, &requirements).await?;
            let json = serde_json::to_string_pretty(&architecture)?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write architecture: {}", output.display()))?;
            println!("Architecture written to {}", output.display());
            println!(
                "Run 'archcost estimate {}' to price it.",
                output.display()
            );
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}
