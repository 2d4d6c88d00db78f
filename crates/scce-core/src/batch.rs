//! Transactional create/update/delete over assignments with
//! pre-validation, optimistic locking, and an optional post-ACGME check.
//! Every item-level failure (duplicate key, missing entity, stale
//! `updated_at`) is reported against that item's index rather than
//! aborting the batch — unless the caller opts into `all_or_nothing`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::constraints::{HardConstraint, Violation};
use crate::domain::{Assignment, AssignmentRole, AssignmentSource};
use crate::error::{SccError, SccResult};
use crate::ports::{AssignmentPatch, Clock, EntityStore};
use crate::validator::Validator;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub validate_acgme: bool,
    pub all_or_nothing: bool,
    /// Runs steps 1-4 (size check, duplicate check, existence check,
    /// optional ACGME pre-check) and reports the result without writing.
    pub dry_run: bool,
    /// Per-call override of the item cap, sourced from
    /// `SccConfig::batch_max_items` by callers that load one.
    pub max_items: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { validate_acgme: true, all_or_nothing: false, dry_run: false, max_items: MAX_BATCH_ITEMS }
    }
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub block_id: Uuid,
    pub person_id: Uuid,
    pub rotation_template_id: Option<Uuid>,
    pub role: AssignmentRole,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct AssignmentUpdate {
    pub id: Uuid,
    pub patch: AssignmentPatch,
    pub expected_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ItemError {
    pub index: usize,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchValidationResult {
    pub valid: bool,
    pub item_errors: Vec<ItemError>,
    /// Non-blocking findings from the ACGME pre-check, one per affected
    /// item index.
    pub warnings: Vec<Violation>,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub validation: BatchValidationResult,
    pub applied_count: usize,
    /// Populated when a write failed partway through an `all_or_nothing`
    /// batch and the transaction was rolled back.
    pub failed_at_index: Option<usize>,
}

const MAX_BATCH_ITEMS: usize = 1000;
/// Window, in days, the ACGME pre-check expands around the batch's date
/// span so rolling-hours and one-in-seven constraints see full context.
const ACGME_PRECHECK_PAD_DAYS: i64 = 28;

pub struct BatchPipeline<'a> {
    pub store: &'a dyn EntityStore,
    pub clock: &'a dyn Clock,
    pub hard_constraints: &'a [Box<dyn HardConstraint>],
}

impl<'a> BatchPipeline<'a> {
    pub async fn batch_create(
        &self,
        items: Vec<NewAssignment>,
        opts: BatchOptions,
    ) -> SccResult<BatchResult> {
        if items.len() > opts.max_items {
            return Err(SccError::Invalid(format!(
                "batch of {} exceeds the {}-item limit",
                items.len(),
                opts.max_items
            )));
        }

        let mut item_errors = Vec::new();
        let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
        for (idx, item) in items.iter().enumerate() {
            if !seen.insert((item.block_id, item.person_id)) {
                item_errors.push(ItemError {
                    index: idx,
                    code: "E_INVALID",
                    message: "duplicate (block_id, person_id) within the batch".to_string(),
                });
                continue;
            }
            if self.store.find_person(item.person_id).await?.is_none() {
                item_errors.push(ItemError { index: idx, code: "E_NOT_FOUND", message: "person not found".to_string() });
                continue;
            }
            if self.store.find_block(item.block_id).await?.is_none() {
                item_errors.push(ItemError { index: idx, code: "E_NOT_FOUND", message: "block not found".to_string() });
                continue;
            }
            if self
                .store
                .find_assignment_by_block_person(item.block_id, item.person_id)
                .await?
                .is_some()
            {
                item_errors.push(ItemError {
                    index: idx,
                    code: "E_CONFLICT_OPTIMISTIC_LOCK",
                    message: "an assignment already exists for this person and block".to_string(),
                });
            }
        }

        let warnings = if opts.validate_acgme && item_errors.is_empty() {
            self.acgme_precheck(&items).await?
        } else {
            Vec::new()
        };

        let validation = BatchValidationResult { valid: item_errors.is_empty(), item_errors, warnings };
        if !validation.valid || opts.dry_run {
            return Ok(BatchResult { validation, applied_count: 0, failed_at_index: None });
        }

        let tx = self.store.begin_tx().await?;
        let mut applied = 0;
        let now = self.clock.now();
        for (idx, item) in items.iter().enumerate() {
            let assignment = Assignment {
                id: Uuid::new_v4(),
                block_id: item.block_id,
                person_id: item.person_id,
                rotation_template_id: item.rotation_template_id,
                role: item.role,
                activity_override: None,
                notes: None,
                override_reason: None,
                override_acknowledged_at: None,
                confidence: None,
                score: None,
                created_by: item.created_by.clone(),
                created_at: now,
                updated_at: now,
                source: AssignmentSource::Manual,
            };
            if let Err(e) = self.store.save_assignment(&assignment).await {
                self.store.rollback(tx).await?;
                warn!(index = idx, error = %e, "batch create failed, rolled back");
                return Ok(BatchResult { validation, applied_count: 0, failed_at_index: Some(idx) });
            }
            applied += 1;
        }
        self.store.commit(tx).await?;

        Ok(BatchResult { validation, applied_count: applied, failed_at_index: None })
    }

    pub async fn batch_update(
        &self,
        items: Vec<AssignmentUpdate>,
        opts: BatchOptions,
    ) -> SccResult<BatchResult> {
        if items.len() > opts.max_items {
            return Err(SccError::Invalid(format!(
                "batch of {} exceeds the {}-item limit",
                items.len(),
                opts.max_items
            )));
        }
        if opts.dry_run {
            let mut item_errors = Vec::new();
            for (idx, item) in items.iter().enumerate() {
                match self.store.find_assignment(item.id).await? {
                    None => item_errors.push(ItemError {
                        index: idx,
                        code: "E_NOT_FOUND",
                        message: "assignment not found".to_string(),
                    }),
                    Some(existing) if existing.updated_at != item.expected_updated_at => {
                        item_errors.push(ItemError {
                            index: idx,
                            code: "E_CONFLICT_OPTIMISTIC_LOCK",
                            message: format!("assignment {} was modified concurrently", item.id),
                        })
                    }
                    Some(_) => {}
                }
            }
            let valid = item_errors.is_empty();
            return Ok(BatchResult {
                validation: BatchValidationResult { valid, item_errors, warnings: Vec::new() },
                applied_count: 0,
                failed_at_index: None,
            });
        }

        let tx = self.store.begin_tx().await?;
        let mut item_errors = Vec::new();
        let mut applied = 0;
        for (idx, item) in items.into_iter().enumerate() {
            match self.store.update_assignment(item.id, item.patch, item.expected_updated_at).await {
                Ok(_) => applied += 1,
                Err(SccError::Conflict(message)) => {
                    item_errors.push(ItemError { index: idx, code: "E_CONFLICT_OPTIMISTIC_LOCK", message });
                    if opts.all_or_nothing {
                        self.store.rollback(tx).await?;
                        return Ok(BatchResult {
                            validation: BatchValidationResult { valid: false, item_errors, warnings: Vec::new() },
                            applied_count: 0,
                            failed_at_index: Some(idx),
                        });
                    }
                }
                Err(e) => {
                    self.store.rollback(tx).await?;
                    return Err(e);
                }
            }
        }
        self.store.commit(tx).await?;

        let valid = item_errors.is_empty();
        Ok(BatchResult {
            validation: BatchValidationResult { valid, item_errors, warnings: Vec::new() },
            applied_count: applied,
            failed_at_index: None,
        })
    }

    pub async fn batch_delete(&self, ids: Vec<Uuid>, opts: BatchOptions) -> SccResult<BatchResult> {
        if ids.len() > opts.max_items {
            return Err(SccError::Invalid(format!("batch of {} exceeds the {}-item limit", ids.len(), opts.max_items)));
        }
        if opts.dry_run {
            let mut item_errors = Vec::new();
            for (idx, id) in ids.iter().enumerate() {
                if self.store.find_assignment(*id).await?.is_none() {
                    item_errors.push(ItemError { index: idx, code: "E_NOT_FOUND", message: "assignment not found".to_string() });
                }
            }
            let valid = item_errors.is_empty();
            return Ok(BatchResult {
                validation: BatchValidationResult { valid, item_errors, warnings: Vec::new() },
                applied_count: 0,
                failed_at_index: None,
            });
        }

        let tx = self.store.begin_tx().await?;
        let mut applied = 0;
        for (idx, id) in ids.into_iter().enumerate() {
            if let Err(e) = self.store.delete_assignment(id).await {
                self.store.rollback(tx).await?;
                return Ok(BatchResult {
                    validation: BatchValidationResult {
                        valid: false,
                        item_errors: vec![ItemError { index: idx, code: "E_NOT_FOUND", message: e.to_string() }],
                        warnings: Vec::new(),
                    },
                    applied_count: 0,
                    failed_at_index: Some(idx),
                });
            }
            applied += 1;
        }
        self.store.commit(tx).await?;

        Ok(BatchResult {
            validation: BatchValidationResult { valid: true, ..Default::default() },
            applied_count: applied,
            failed_at_index: None,
        })
    }

    async fn acgme_precheck(&self, items: &[NewAssignment]) -> SccResult<Vec<Violation>> {
        let Some((min_date, max_date)) = self.item_date_span(items).await? else {
            return Ok(Vec::new());
        };
        let validator = Validator { store: self.store, hard_constraints: self.hard_constraints };
        let report = validator
            .validate_period(
                min_date - chrono::Duration::days(ACGME_PRECHECK_PAD_DAYS),
                max_date + chrono::Duration::days(ACGME_PRECHECK_PAD_DAYS),
            )
            .await?;
        Ok(report.violations)
    }

    async fn item_date_span(&self, items: &[NewAssignment]) -> SccResult<Option<(chrono::NaiveDate, chrono::NaiveDate)>> {
        let mut span: Option<(chrono::NaiveDate, chrono::NaiveDate)> = None;
        for item in items {
            let Some(block) = self.store.find_block(item.block_id).await? else { continue };
            span = Some(match span {
                None => (block.date, block.date),
                Some((min_date, max_date)) => (min_date.min(block.date), max_date.max(block.date)),
            });
        }
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{make_block, make_resident};
    use crate::ports::MockClock;
    use crate::ports::MockEntityStore;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn rejects_batches_over_the_item_cap() {
        let store = MockEntityStore::new();
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
        let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

        let items = (0..1001)
            .map(|_| NewAssignment {
                block_id: Uuid::new_v4(),
                person_id: Uuid::new_v4(),
                rotation_template_id: None,
                role: AssignmentRole::Primary,
                created_by: "test".to_string(),
            })
            .collect();

        let err = pipeline.batch_create(items, BatchOptions::default()).await.unwrap_err();
        assert_eq!(err.code(), "E_INVALID");
    }

    #[tokio::test]
    async fn dry_run_validates_without_writing() {
        let resident = make_resident("R1", 1);
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), crate::domain::TimeOfDay::Am, 0);
        let person_id = resident.id;
        let block_id = block.id;

        let mut store = MockEntityStore::new();
        store.expect_find_person().returning(move |_| Ok(Some(resident.clone())));
        store.expect_find_block().returning(move |_| Ok(Some(block.clone())));
        store.expect_find_assignment_by_block_person().returning(|_, _| Ok(None));
        store.expect_save_assignment().never();

        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
        let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

        let items = vec![NewAssignment {
            block_id,
            person_id,
            rotation_template_id: None,
            role: AssignmentRole::Primary,
            created_by: "test".to_string(),
        }];

        let opts = BatchOptions { validate_acgme: false, dry_run: true, ..Default::default() };
        let result = pipeline.batch_create(items, opts).await.unwrap();
        assert!(result.validation.valid);
        assert_eq!(result.applied_count, 0);
    }

    #[tokio::test]
    async fn duplicate_within_batch_is_an_item_error() {
        let block_id = Uuid::new_v4();
        let person_id = Uuid::new_v4();
        let store = MockEntityStore::new();
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
        let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

        let items = vec![
            NewAssignment { block_id, person_id, rotation_template_id: None, role: AssignmentRole::Primary, created_by: "t".to_string() },
            NewAssignment { block_id, person_id, rotation_template_id: None, role: AssignmentRole::Primary, created_by: "t".to_string() },
        ];

        let opts = BatchOptions { validate_acgme: false, ..Default::default() };
        let result = pipeline.batch_create(items, opts).await.unwrap();
        assert!(!result.validation.valid);
        assert_eq!(result.validation.item_errors.len(), 1);
        assert_eq!(result.validation.item_errors[0].index, 1);
    }

    #[tokio::test]
    async fn update_dry_run_reports_stale_lock_without_writing() {
        let now = Utc::now();
        let assignment_id = Uuid::new_v4();

        let mut store = MockEntityStore::new();
        store.expect_find_assignment().returning(move |_| {
            Ok(Some(Assignment {
                id: assignment_id,
                block_id: Uuid::new_v4(),
                person_id: Uuid::new_v4(),
                rotation_template_id: None,
                role: AssignmentRole::Primary,
                activity_override: None,
                notes: None,
                override_reason: None,
                override_acknowledged_at: None,
                confidence: None,
                score: None,
                created_by: "test".to_string(),
                created_at: now,
                updated_at: now,
                source: AssignmentSource::Manual,
            }))
        });
        store.expect_update_assignment().never();

        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
        let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

        let items = vec![AssignmentUpdate {
            id: assignment_id,
            patch: AssignmentPatch::default(),
            expected_updated_at: now - chrono::Duration::hours(1),
        }];

        let opts = BatchOptions { dry_run: true, ..Default::default() };
        let result = pipeline.batch_update(items, opts).await.unwrap();
        assert!(!result.validation.valid);
        assert_eq!(result.validation.item_errors[0].code, "E_CONFLICT_OPTIMISTIC_LOCK");
        assert_eq!(result.applied_count, 0);
    }

    #[tokio::test]
    async fn delete_dry_run_reports_missing_assignment_without_writing() {
        let mut store = MockEntityStore::new();
        store.expect_find_assignment().returning(|_| Ok(None));
        store.expect_delete_assignment().never();

        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
        let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

        let opts = BatchOptions { dry_run: true, ..Default::default() };
        let result = pipeline.batch_delete(vec![Uuid::new_v4()], opts).await.unwrap();
        assert!(!result.validation.valid);
        assert_eq!(result.validation.item_errors[0].code, "E_NOT_FOUND");
        assert_eq!(result.applied_count, 0);
    }
}
