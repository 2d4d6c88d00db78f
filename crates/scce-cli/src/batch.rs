//! `scce batch` — apply a batch of assignment creates read from a JSON file.
//!
//! The file holds an array of `{block_id, person_id, rotation_template_id,
//! role}` objects; `created_by` and the ACGME pre-check toggle are CLI
//! flags rather than per-item fields.

use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use scce_core::batch::{BatchOptions, BatchPipeline, NewAssignment};
use scce_core::config::SccConfig;
use scce_core::constraints::ConstraintRegistry;
use scce_core::domain::AssignmentRole;
use scce_core::ports::SystemClock;

use crate::store::Store;

#[derive(Args)]
pub struct BatchArgs {
    /// Path to a JSON array of assignment creates.
    #[arg(long)]
    file: std::path::PathBuf,
    #[arg(long, default_value = "cli")]
    created_by: String,
    #[arg(long)]
    skip_acgme_precheck: bool,
    #[arg(long)]
    all_or_nothing: bool,
    #[arg(long)]
    dry_run: bool,
}

#[derive(Deserialize)]
struct BatchItem {
    block_id: Uuid,
    person_id: Uuid,
    rotation_template_id: Option<Uuid>,
    role: AssignmentRole,
}

pub async fn run(database_url: &Option<String>, config: &SccConfig, args: BatchArgs) -> anyhow::Result<()> {
    let store = Store::open(database_url).await?;
    let clock = SystemClock;
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

    let raw = std::fs::read_to_string(&args.file)?;
    let items: Vec<BatchItem> = serde_json::from_str(&raw)?;
    let items = items
        .into_iter()
        .map(|item| NewAssignment {
            block_id: item.block_id,
            person_id: item.person_id,
            rotation_template_id: item.rotation_template_id,
            role: item.role,
            created_by: args.created_by.clone(),
        })
        .collect();

    let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard_constraints };
    let opts = BatchOptions {
        validate_acgme: !args.skip_acgme_precheck,
        all_or_nothing: args.all_or_nothing,
        dry_run: args.dry_run,
        max_items: config.batch_max_items,
    };
    let result = pipeline.batch_create(items, opts).await?;

    println!(
        "valid={} applied_count={} failed_at_index={:?}",
        result.validation.valid, result.applied_count, result.failed_at_index
    );
    for err in &result.validation.item_errors {
        println!("  item {}: [{}] {}", err.index, err.code, err.message);
    }
    for warning in &result.validation.warnings {
        println!("  warning: [{:?}] {}", warning.severity, warning.message);
    }
    Ok(())
}
