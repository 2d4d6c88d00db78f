//! `scce validate` — re-check a period's persisted assignments against
//! every hard constraint and print the resulting compliance metrics.

use clap::Args;
use colored::Colorize;

use scce_core::config::SccConfig;
use scce_core::constraints::ConstraintRegistry;
use scce_core::validator::Validator;

use crate::store::Store;

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(long)]
    start: chrono::NaiveDate,
    #[arg(long)]
    end: chrono::NaiveDate,
    /// Print every violation, not just the summary metrics.
    #[arg(long)]
    verbose: bool,
}

pub async fn run(database_url: &Option<String>, config: &SccConfig, args: ValidateArgs) -> anyhow::Result<()> {
    let store = Store::open(database_url).await?;
    let registry = ConstraintRegistry::with_defaults();

    let hard_names = [
        "Availability",
        "OnePerBlock",
        "Capacity",
        "EightyHourRolling",
        "OneInSeven",
        "WednesdayAMInternOnly",
        "WednesdayPMLEC",
        "PGY1WednesdayAMContinuity",
        "NightFloatAMPattern",
        "SupervisionRatio",
        "SpecialtyAndPGYGating",
    ];
    let hard_constraints = hard_names
        .iter()
        .map(|name| {
            registry
                .build_hard(name, &crate::config::hard_constraint_params(name, config))
                .map_err(anyhow::Error::msg)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let validator = Validator { store: &store, hard_constraints: &hard_constraints };
    let report = validator.validate_period(args.start, args.end).await?;

    let rate = format!("{:.3}", report.metrics.compliance_rate);
    let rate = if report.metrics.compliance_rate >= 0.95 {
        rate.green()
    } else if report.metrics.compliance_rate >= 0.8 {
        rate.yellow()
    } else {
        rate.red().bold()
    };
    println!(
        "total_assignments={} violations={} compliance_rate={rate}",
        report.metrics.total_assignments, report.metrics.total_violations
    );
    for (severity, count) in &report.metrics.violations_by_severity {
        println!("  {severity:?}: {count}");
    }
    if args.verbose {
        for violation in &report.violations {
            println!(
                "[{:?}] {} — {} ({})",
                violation.severity, violation.constraint_name, violation.message, violation.affected_ref
            );
        }
    }
    Ok(())
}
