//! `scce generate` — solve a period into a persisted assignment set.

use std::time::Duration;

use clap::{Args, ValueEnum};
use colored::Colorize;

use scce_core::config::SccConfig;
use scce_core::constraints::ConstraintRegistry;
use scce_core::generator::{GenerationRequest, ScheduleGenerator, SolverChoice};
use scce_core::ports::{SystemClock, TracingMetricsSink};

use crate::store::Store;

#[derive(Args)]
pub struct GenerateArgs {
    #[arg(long)]
    start: chrono::NaiveDate,
    #[arg(long)]
    end: chrono::NaiveDate,
    #[arg(long, value_enum, default_value_t = Solver::CpSat)]
    solver: Solver,
    /// Solver deadline in seconds. Defaults to `SccConfig::solver_timeout`.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long, default_value = "cli")]
    created_by: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Solver {
    CpSat,
    Linear,
}

pub async fn run(database_url: &Option<String>, config: &SccConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let store = Store::open(database_url).await?;
    let clock = SystemClock;
    let metrics = TracingMetricsSink;
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

    let soft_names = ["Equity", "PreferWednesdayCall", "AvoidBackToBackCall"];
    let soft_constraints = soft_names
        .iter()
        .map(|name| registry.build_soft(name, &serde_json::Value::Null).map_err(anyhow::Error::msg))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let generator = ScheduleGenerator { store: &store, clock: &clock, metrics: &metrics, hard_constraints, soft_constraints };

    let report = generator
        .generate(GenerationRequest {
            start: args.start,
            end: args.end,
            solver: match args.solver {
                Solver::CpSat => SolverChoice::CpSat,
                Solver::Linear => SolverChoice::Linear,
            },
            timeout: args.timeout_secs.map(Duration::from_secs).unwrap_or(config.solver_timeout),
            created_by: args.created_by,
        })
        .await?;

    let status = format!("{:?}", report.status);
    let status = match report.status {
        scce_core::solver::SolveStatus::Optimal | scce_core::solver::SolveStatus::Feasible => status.green().bold(),
        scce_core::solver::SolveStatus::Empty => status.yellow(),
        _ => status.red().bold(),
    };
    println!(
        "status={status} assignments_created={} objective={:.2} elapsed={:?}",
        report.assignments_created, report.objective_value, report.elapsed
    );
    Ok(())
}
