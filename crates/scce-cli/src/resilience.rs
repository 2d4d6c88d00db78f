//! `scce resilience` — N-1/N-2 contingency, cascade simulation, and SPC
//! control-chart analysis.

use std::collections::HashMap;

use clap::{Args, Subcommand};

use scce_core::config::SccConfig;
use scce_core::resilience::{AnalysisParams, AnalysisResult, CascadeParams, ResilienceAnalyzer};

use crate::store::Store;

#[derive(Subcommand)]
pub enum ResilienceCommand {
    /// Single-point-of-failure analysis for one person.
    N1(N1Args),
    /// Simultaneous two-person failure analysis.
    N2(N2Args),
    /// Monte-Carlo faculty-attrition cascade simulation. Does not touch a
    /// store — runs standalone.
    Cascade(CascadeArgs),
    /// X-bar control chart built from a baseline, evaluated against samples.
    /// Does not touch a store — runs standalone.
    Spc(SpcArgs),
}

#[derive(Args)]
pub struct N1Args {
    #[arg(long)]
    start: chrono::NaiveDate,
    #[arg(long)]
    end: chrono::NaiveDate,
    #[arg(long)]
    person_id: uuid::Uuid,
    /// Comma-separated backup identifiers.
    #[arg(long, value_delimiter = ',')]
    backups: Vec<String>,
    /// Uniform per-backup slot capacity applied to every listed backup.
    #[arg(long, default_value_t = 4)]
    backup_capacity: u32,
}

#[derive(Args)]
pub struct N2Args {
    #[arg(long)]
    start: chrono::NaiveDate,
    #[arg(long)]
    end: chrono::NaiveDate,
    #[arg(long)]
    person_a: uuid::Uuid,
    #[arg(long)]
    person_b: uuid::Uuid,
    #[arg(long, value_delimiter = ',')]
    backups: Vec<String>,
    #[arg(long, default_value_t = 4)]
    backup_capacity: u32,
}

#[derive(Args)]
pub struct CascadeArgs {
    #[arg(long)]
    initial_faculty: u32,
    #[arg(long)]
    total_workload: f64,
    #[arg(long, default_value_t = 180)]
    max_days: u32,
    #[arg(long, default_value_t = 500)]
    runs: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
pub struct SpcArgs {
    #[arg(long, value_delimiter = ',')]
    baseline: Vec<f64>,
    #[arg(long, value_delimiter = ',')]
    samples: Vec<f64>,
    #[arg(long, default_value_t = 3.0)]
    sigma_multiplier: f64,
}

pub async fn run(database_url: &Option<String>, config: &SccConfig, command: ResilienceCommand) -> anyhow::Result<()> {
    match command {
        ResilienceCommand::N1(args) => {
            let store = Store::open(database_url).await?;
            let analyzer = ResilienceAnalyzer { store: &store, cascade_config: config.cascade };
            let backup_capacity: HashMap<String, u32> =
                args.backups.iter().map(|b| (b.clone(), args.backup_capacity)).collect();
            let result = analyzer
                .analyze_resilience(
                    args.start,
                    args.end,
                    AnalysisParams::N1 { person_id: args.person_id, available_backups: args.backups, backup_capacity },
                )
                .await?;
            let AnalysisResult::N1(scenario) = result else { unreachable!() };
            println!(
                "affected_slots={} criticality={:.2} backup_available={} mitigation={}",
                scenario.affected_slots, scenario.criticality_score, scenario.backup_available, scenario.mitigation_strategy
            );
        }
        ResilienceCommand::N2(args) => {
            let store = Store::open(database_url).await?;
            let analyzer = ResilienceAnalyzer { store: &store, cascade_config: config.cascade };
            let backup_capacity: HashMap<String, u32> =
                args.backups.iter().map(|b| (b.clone(), args.backup_capacity)).collect();
            let result = analyzer
                .analyze_resilience(
                    args.start,
                    args.end,
                    AnalysisParams::N2 {
                        person_a: args.person_a,
                        person_b: args.person_b,
                        available_backups: args.backups,
                        backup_capacity,
                    },
                )
                .await?;
            let AnalysisResult::N2(scenario) = result else { unreachable!() };
            println!(
                "combined_affected_slots={} criticality={:.2} backup_available={}",
                scenario.combined_affected_slots, scenario.criticality_score, scenario.backup_available
            );
        }
        ResilienceCommand::Cascade(args) => {
            let store = Store::open(database_url).await?;
            let analyzer = ResilienceAnalyzer { store: &store, cascade_config: config.cascade };
            let result = analyzer
                .analyze_resilience(
                    chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                    chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                    AnalysisParams::Cascade(CascadeParams {
                        initial_faculty: args.initial_faculty,
                        total_workload: args.total_workload,
                        max_days: args.max_days,
                        runs: args.runs,
                        seed: args.seed,
                    }),
                )
                .await?;
            let AnalysisResult::Cascade(report) = result else { unreachable!() };
            println!(
                "runs={} survival_rate={:.3} avg_days_to_collapse={:?} peak_workload={:.2} peak_fatigue_level={} risk={:?}",
                report.runs,
                report.survival_rate,
                report.average_days_to_collapse,
                report.peak_workload,
                report.peak_fatigue_level,
                report.risk
            );
        }
        ResilienceCommand::Spc(args) => {
            let store = Store::open(database_url).await?;
            let analyzer = ResilienceAnalyzer { store: &store, cascade_config: config.cascade };
            let result = analyzer
                .analyze_resilience(
                    chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                    chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                    AnalysisParams::Spc { baseline: args.baseline, samples: args.samples, sigma_multiplier: args.sigma_multiplier },
                )
                .await?;
            let AnalysisResult::Spc { limits, points } = result else { unreachable!() };
            println!("center={:.3} ucl={:.3} lcl={:.3}", limits.center_line, limits.ucl, limits.lcl);
            for point in points {
                println!("  value={:.3} zone={:?} in_control={}", point.value, point.zone, point.is_in_control);
            }
        }
    }
    Ok(())
}
