//! Command-line front door for the Schedule Construction & Compliance
//! Engine: generate and validate schedules, run batch mutations, match
//! swap requests, run resilience analytics, and query the academic
//! calendar — against either a Postgres database or a seeded in-memory
//! demo program.

mod batch;
mod calendar;
mod config;
mod generate;
mod resilience;
mod store;
mod swap_match;
mod validate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scce", version, about = "Schedule Construction & Compliance Engine")]
struct Cli {
    /// Postgres connection string. Falls back to a seeded in-memory demo
    /// program when omitted (requires the `postgres` feature to use).
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Academic calendar lookups: block boundaries and date-to-block mapping.
    Calendar {
        #[command(subcommand)]
        command: calendar::CalendarCommand,
    },
    /// Solve a period into a persisted assignment set.
    Generate(generate::GenerateArgs),
    /// Re-check a period's persisted assignments against every hard constraint.
    Validate(validate::ValidateArgs),
    /// Apply a batch of assignment creates from a JSON file.
    Batch(batch::BatchArgs),
    /// Rank pending swap requests against a source swap.
    SwapMatch(swap_match::SwapMatchArgs),
    /// Resilience analytics: N-1/N-2 contingency, cascade simulation, SPC.
    Resilience {
        #[command(subcommand)]
        command: resilience::ResilienceCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();
    let config = config::load();

    match cli.command {
        Commands::Calendar { command } => calendar::run(command),
        Commands::Generate(args) => generate::run(&cli.database_url, &config, args).await,
        Commands::Validate(args) => validate::run(&cli.database_url, &config, args).await,
        Commands::Batch(args) => batch::run(&cli.database_url, &config, args).await,
        Commands::SwapMatch(args) => swap_match::run(&cli.database_url, &config, args).await,
        Commands::Resilience { command } => resilience::run(&cli.database_url, &config, command).await,
    }
}
