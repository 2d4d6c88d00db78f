//! Loads `SccConfig` for the binary: start from `SccConfig::default()`,
//! override individual fields from environment variables (populated by
//! `dotenvy::dotenv()` in `main` before this runs), and let per-command
//! `clap` flags take the final say when the caller passes them explicitly.

use std::time::Duration;

use scce_core::config::SccConfig;

fn env_u32(key: &str, current: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(current)
}

fn env_u64(key: &str, current: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(current)
}

fn env_i64(key: &str, current: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(current)
}

fn env_f64(key: &str, current: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(current)
}

fn env_usize(key: &str, current: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(current)
}

/// Registry constructor parameters for `name`, sourced from `config`
/// instead of the registry's own hardcoded fallbacks.
pub fn hard_constraint_params(name: &str, config: &SccConfig) -> serde_json::Value {
    match name {
        "Capacity" => serde_json::json!({ "default_max_residents": config.default_physical_capacity }),
        "EightyHourRolling" => serde_json::json!({ "max_hours": config.max_weekly_hours }),
        "OneInSeven" => serde_json::json!({ "min_rest_days_per_week": config.min_rest_days_per_week }),
        _ => serde_json::Value::Null,
    }
}

pub fn load() -> SccConfig {
    let defaults = SccConfig::default();
    SccConfig {
        solver_timeout: Duration::from_secs(env_u64("SCCE_SOLVER_TIMEOUT_SECS", defaults.solver_timeout.as_secs())),
        default_physical_capacity: env_u32("SCCE_DEFAULT_PHYSICAL_CAPACITY", defaults.default_physical_capacity),
        max_weekly_hours: env_u32("SCCE_MAX_WEEKLY_HOURS", defaults.max_weekly_hours),
        min_rest_days_per_week: env_u32("SCCE_MIN_REST_DAYS_PER_WEEK", defaults.min_rest_days_per_week),
        swap_max_date_distance_days: env_i64("SCCE_SWAP_MAX_DATE_DISTANCE_DAYS", defaults.swap_max_date_distance_days),
        swap_min_preference_score: env_f64("SCCE_SWAP_MIN_PREFERENCE_SCORE", defaults.swap_min_preference_score),
        batch_max_items: env_usize("SCCE_BATCH_MAX_ITEMS", defaults.batch_max_items),
        ..defaults
    }
}
