//! Auto start/stop operator CLI
//!
//! Runs scheduler invocations by hand, previews which resources a schedule
//! tag selects, and inspects node group scaling tags.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{descriptor, locate, policies, run};
use scheduler_lib::{ResourceCategory, SCHEDULE_TAG_KEY};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Auto start/stop operator CLI
#[derive(Parser)]
#[command(name = "asctl")]
#[command(author, version, about = "CLI for the Auto Start/Stop scheduler", long_about = None)]
pub struct Cli {
    /// Region to operate in
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Named credentials profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start or stop every resource carrying a schedule tag
    Run {
        /// Action to perform (start, stop)
        #[arg(long)]
        automation: String,

        /// Resource category (ec2, rds, eks)
        #[arg(long)]
        resource: String,

        /// Schedule tag value, e.g. OfficeHour
        #[arg(long)]
        tag_value: String,

        /// Schedule tag key
        #[arg(long, default_value = SCHEDULE_TAG_KEY)]
        tag_key: String,
    },

    /// List the resources a schedule tag selects, without changing them
    Locate {
        /// Resource category (ec2, rds, eks)
        #[arg(long, value_parser = parse_category)]
        resource: ResourceCategory,

        /// Schedule tag value, e.g. OfficeHour
        #[arg(long)]
        tag_value: String,

        /// Schedule tag key
        #[arg(long, default_value = SCHEDULE_TAG_KEY)]
        tag_key: String,
    },

    /// Encode a node group capacity into a scaling tag value
    Encode {
        /// Minimum size
        #[arg(long)]
        min: u32,

        /// Maximum size
        #[arg(long)]
        max: u32,

        /// Desired size
        #[arg(long)]
        desired: u32,
    },

    /// Decode a scaling tag value
    Decode {
        /// Tag value as stored on the node group
        token: String,
    },

    /// List recognised schedule tag values
    Policies,
}

fn parse_category(value: &str) -> Result<ResourceCategory, String> {
    ResourceCategory::parse(value)
        .ok_or_else(|| format!("unknown resource '{}' (expected ec2, rds or eks)", value))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    if let Err(err) = execute(cli).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    match cli.command {
        Commands::Run {
            automation,
            resource,
            tag_value,
            tag_key,
        } => {
            let settings = config.resolve(cli.region, cli.profile, cli.format)?;
            run::run_invocation(&settings, &automation, &resource, &tag_key, &tag_value).await?;
        }
        Commands::Locate {
            resource,
            tag_value,
            tag_key,
        } => {
            let settings = config.resolve(cli.region, cli.profile, cli.format)?;
            locate::locate_resources(&settings, resource, &tag_key, &tag_value).await?;
        }
        Commands::Encode { min, max, desired } => {
            descriptor::encode_descriptor(min, max, desired, config.output_format(cli.format))?;
        }
        Commands::Decode { token } => {
            descriptor::decode_descriptor(&token, config.output_format(cli.format))?;
        }
        Commands::Policies => {
            policies::list_policies(config.output_format(cli.format))?;
        }
    }

    Ok(())
}
