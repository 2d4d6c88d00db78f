//! `scce swap-match` — rank pending swap requests against a source swap.

use clap::Args;

use scce_core::config::SccConfig;
use scce_core::swap_matcher::SwapMatcher;

use crate::store::Store;

#[derive(Args)]
pub struct SwapMatchArgs {
    #[arg(long)]
    swap_id: uuid::Uuid,
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    /// Defaults to `SccConfig::swap_max_date_distance_days`.
    #[arg(long)]
    max_date_distance_days: Option<i64>,
    /// Defaults to `SccConfig::swap_min_preference_score`.
    #[arg(long)]
    min_preference_score: Option<f64>,
}

pub async fn run(database_url: &Option<String>, config: &SccConfig, args: SwapMatchArgs) -> anyhow::Result<()> {
    let store = Store::open(database_url).await?;
    let max_date_distance_days = args.max_date_distance_days.unwrap_or(config.swap_max_date_distance_days);
    let min_preference_score = args.min_preference_score.unwrap_or(config.swap_min_preference_score);
    let matcher = SwapMatcher {
        repository: &store,
        weights: config.swap_weights,
        max_date_distance_days,
        min_preference_score,
    };

    let ranked = matcher.find_matches(args.swap_id, args.top_k).await?;
    if ranked.is_empty() {
        println!("no candidates scored at or above {min_preference_score}");
    }
    for candidate in ranked {
        println!(
            "score={:.3} swap_id={} source_person={} week={}",
            candidate.score, candidate.swap.id, candidate.swap.source_person_id, candidate.swap.source_week_start
        );
    }
    Ok(())
}
