//! Academic calendar lookups: no store, no async, just the pure functions
//! in `scce_core::calendar`.

use clap::Subcommand;
use scce_core::calendar;

#[derive(Subcommand)]
pub enum CalendarCommand {
    /// Print a block's start/end dates.
    Block {
        #[arg(long)]
        block: u8,
        #[arg(long)]
        year: i32,
    },
    /// Print which block and academic year a date falls in.
    Locate {
        #[arg(long)]
        date: chrono::NaiveDate,
    },
    /// Verify an academic year's 14 blocks tile the year with no gaps.
    Check {
        #[arg(long)]
        year: i32,
    },
}

pub fn run(command: CalendarCommand) -> anyhow::Result<()> {
    match command {
        CalendarCommand::Block { block, year } => {
            let dates = calendar::block_dates(block, year)?;
            println!("block {block} ({year}): {} .. {} ({} days)", dates.start, dates.end, dates.duration_days);
        }
        CalendarCommand::Locate { date } => {
            let (block, year) = calendar::block_number_for_date(date);
            let half = calendar::block_half(date);
            println!("{date}: block {block}, academic year {year}, half {half}");
        }
        CalendarCommand::Check { year } => match calendar::validate_alignment(year) {
            Ok(()) => println!("academic year {year}: aligned"),
            Err(message) => anyhow::bail!("academic year {year}: {message}"),
        },
    }
    Ok(())
}
