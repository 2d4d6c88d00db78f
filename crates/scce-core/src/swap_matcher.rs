//! Scores every other `PENDING` swap against a source swap and ranks
//! candidates for a human to act on. Never mutates a `SwapRecord` itself —
//! approval/rejection is a caller decision.

use uuid::Uuid;

use crate::config::SwapWeights;
use crate::domain::SwapRecord;
use crate::error::{SccError, SccResult};
use crate::ports::SwapRepository;

#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub swap: SwapRecord,
    pub score: f64,
}

pub struct SwapMatcher<'a> {
    pub repository: &'a dyn SwapRepository,
    pub weights: SwapWeights,
    pub max_date_distance_days: i64,
    pub min_preference_score: f64,
}

impl<'a> SwapMatcher<'a> {
    pub async fn find_matches(&self, source_swap_id: Uuid, top_k: usize) -> SccResult<Vec<RankedCandidate>> {
        let source = self
            .repository
            .find(source_swap_id)
            .await?
            .ok_or_else(|| SccError::NotFound(format!("swap {source_swap_id}")))?;

        if source.status != crate::domain::SwapStatus::Pending {
            return Err(SccError::Invalid("source swap is not PENDING".to_string()));
        }

        let candidates = self.repository.list_other_pending(source.source_person_id).await?;

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|candidate| RankedCandidate { score: self.score(&source, &candidate), swap: candidate })
            .filter(|c| c.score >= self.min_preference_score)
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then_with(|| a.swap.id.cmp(&b.swap.id)));
        ranked.truncate(top_k);
        Ok(ranked)
    }

    fn score(&self, source: &SwapRecord, candidate: &SwapRecord) -> f64 {
        let date_proximity = self.date_proximity(source, candidate);
        let swap_type_compat = if source.swap_type == candidate.swap_type { 1.0 } else { 0.5 };
        let faculty_preference_alignment = preference_alignment(source, candidate);

        self.weights.date_proximity * date_proximity
            + self.weights.type_compat * swap_type_compat
            + self.weights.faculty_preference * faculty_preference_alignment
    }

    fn date_proximity(&self, source: &SwapRecord, candidate: &SwapRecord) -> f64 {
        let delta_days = (candidate.source_week_start - source.source_week_start).num_days().abs();
        (1.0 - delta_days as f64 / self.max_date_distance_days as f64).max(0.0)
    }
}

/// Fraction of the source swap's preference tags the candidate also
/// carries; `1.0` when the source has no tags to match against (no
/// preference recorded means alignment doesn't penalise the candidate).
fn preference_alignment(source: &SwapRecord, candidate: &SwapRecord) -> f64 {
    if source.faculty_preference_tags.is_empty() {
        return 1.0;
    }
    let shared = source
        .faculty_preference_tags
        .iter()
        .filter(|tag| candidate.faculty_preference_tags.contains(tag))
        .count();
    shared as f64 / source.faculty_preference_tags.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SwapStatus, SwapType};
    use chrono::{NaiveDate, Utc};

    fn swap(id: Uuid, person: Uuid, week: NaiveDate, swap_type: SwapType, status: SwapStatus) -> SwapRecord {
        SwapRecord {
            id,
            source_person_id: person,
            source_week_start: week,
            target_person_id: None,
            target_week_start: None,
            swap_type,
            status,
            created_at: Utc::now(),
            faculty_preference_tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn ranks_closer_dates_higher() {
        let source_id = Uuid::new_v4();
        let near_id = Uuid::new_v4();
        let far_id = Uuid::new_v4();
        let source_person = Uuid::new_v4();
        let week = NaiveDate::from_ymd_opt(2026, 7, 6).unwrap();

        let source = swap(source_id, source_person, week, SwapType::OneToOne, SwapStatus::Pending);
        let near = swap(near_id, Uuid::new_v4(), week + chrono::Duration::days(7), SwapType::OneToOne, SwapStatus::Pending);
        let far = swap(far_id, Uuid::new_v4(), week + chrono::Duration::days(56), SwapType::OneToOne, SwapStatus::Pending);

        let mut repo = crate::ports::MockSwapRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(source)));
        repo.expect_list_other_pending().returning(move |_| Ok(vec![near.clone(), far.clone()]));

        let matcher = SwapMatcher {
            repository: &repo,
            weights: SwapWeights::default(),
            max_date_distance_days: 60,
            min_preference_score: 0.0,
        };

        let ranked = matcher.find_matches(source_id, 5).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].swap.id, near_id);
        assert_eq!(ranked[1].swap.id, far_id);
    }

    #[tokio::test]
    async fn rejects_non_pending_source() {
        let source_id = Uuid::new_v4();
        let source = swap(
            source_id,
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 7, 6).unwrap(),
            SwapType::OneToOne,
            SwapStatus::Approved,
        );
        let mut repo = crate::ports::MockSwapRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(source)));

        let matcher = SwapMatcher {
            repository: &repo,
            weights: SwapWeights::default(),
            max_date_distance_days: 60,
            min_preference_score: 0.0,
        };

        let err = matcher.find_matches(source_id, 5).await.unwrap_err();
        assert_eq!(err.code(), "E_INVALID");
    }
}
