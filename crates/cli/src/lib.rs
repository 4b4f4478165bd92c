use anyhow::Result;
use clap::{Parser, Subcommand};
use command::autofetch::AutofetchArgs;
use command::labels::LabelsArgs;
use command::query::QueryArgs;
use config::HarvestConfig;
use std::io;
use std::path::PathBuf;

mod command;
mod config;
mod flags;
mod render;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest ranked concepts from wiki page sections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./harvest.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest concepts for a batch of pages and write the result files
    Autofetch(AutofetchArgs),

    /// Query the NLU service for one part of one page
    Query(QueryArgs),

    /// Resolve knowledge-base ids to labels
    Labels(LabelsArgs),
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cfg = HarvestConfig::load(cli.config.as_deref())?;
    log::debug!(
        "GraphQL: {}, NLU: {}, labels: {}",
        cfg.graphql_url,
        cfg.nlu_url,
        cfg.labels_url
    );

    let output = match cli.command {
        Commands::Autofetch(args) => command::autofetch::run(args, &cfg).await,
        Commands::Query(args) => command::query::run(args, &cfg).await,
        Commands::Labels(args) => command::labels::run(args, &cfg).await,
    };

    match output {
        Ok(text) => print_stdout(&text),
        Err(err) => {
            log::error!("{err:#}");
            Err(err)
        }
    }
}
