use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "schemabridge", version, about = "Schema layouts for models, SQL translated back")]
struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "SCHEMABRIDGE_CONFIG",
        default_value = "schemabridge.yaml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the schema layout handed to a model.
    Render {
        /// Render the unfiltered raw layout, loadable as a `layout` source.
        #[arg(long, default_value_t = false)]
        cache: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate SQL written against proper names to the real identifiers.
    Translate {
        /// SQL text. Read from --file or stdin when omitted.
        sql: Option<String>,

        /// Read the SQL from a file.
        #[arg(short, long, conflicts_with = "sql")]
        file: Option<PathBuf>,

        /// Print renamed and unresolved identifiers as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate the configuration and its source.
    Check,

    /// Inspect the loaded catalog.
    Inspect {
        /// Table to describe, as "table" or "schema.table".
        #[arg(long)]
        entity: Option<String>,

        /// Print the translation map as JSON.
        #[arg(long, default_value_t = false, conflicts_with = "entity")]
        map: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Render { cache, output } => commands::render::run(&cli.config, cache, output)?,
        Command::Translate { sql, file, json } => {
            commands::translate::run(&cli.config, sql, file, json)?
        }
        Command::Check => commands::check::run(&cli.config)?,
        Command::Inspect { entity, map } => {
            commands::inspect::run(&cli.config, entity.as_deref(), map)?
        }
    }

    Ok(())
}
