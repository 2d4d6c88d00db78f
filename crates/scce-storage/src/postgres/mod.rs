//! Postgres-backed `EntityStore` + `SwapRepository`, gated behind the
//! `postgres` feature so `scce-cli` can ship without a database at all.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use scce_core::domain::{
    Absence, AbsenceType, ActivityType, Assignment, AssignmentRole, AssignmentSource, Block,
    CallPreload, CallType, InpatientPreload, InpatientRotationType, Person, AdminType, PersonKind,
    RotationTemplate, SwapRecord, SwapStatus, SwapType, TimeOfDay,
};
use scce_core::error::{SccError, SccResult};
use scce_core::ports::{AssignmentPatch, EntityStore, PeriodSnapshot, SwapRepository, TxToken};

pub async fn connect(database_url: &str) -> crate::error::Result<PgPool> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn load_period(&self, start: NaiveDate, end: NaiveDate) -> SccResult<PeriodSnapshot> {
        let persons = sqlx::query("SELECT * FROM persons")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_person)
            .collect::<SccResult<Vec<_>>>()?;

        let blocks = sqlx::query("SELECT * FROM blocks WHERE date BETWEEN $1 AND $2")
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_block)
            .collect::<SccResult<Vec<_>>>()?;

        let templates = sqlx::query("SELECT * FROM rotation_templates")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_template)
            .collect::<SccResult<Vec<_>>>()?;

        let assignments = sqlx::query(
            "SELECT a.* FROM assignments a JOIN blocks b ON b.id = a.block_id WHERE b.date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?
        .iter()
        .map(row_to_assignment)
        .collect::<SccResult<Vec<_>>>()?;

        let absences = sqlx::query("SELECT * FROM absences WHERE start_date <= $2 AND end_date >= $1")
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_absence)
            .collect::<SccResult<Vec<_>>>()?;

        let inpatient_preloads =
            sqlx::query("SELECT * FROM inpatient_preloads WHERE start_date <= $2 AND end_date >= $1")
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?
                .iter()
                .map(row_to_inpatient_preload)
                .collect::<SccResult<Vec<_>>>()?;

        let call_preloads = sqlx::query("SELECT * FROM call_preloads WHERE call_date BETWEEN $1 AND $2")
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_call_preload)
            .collect::<SccResult<Vec<_>>>()?;

        Ok(PeriodSnapshot { persons, blocks, templates, assignments, absences, inpatient_preloads, call_preloads })
    }

    async fn save_assignment(&self, assignment: &Assignment) -> SccResult<()> {
        sqlx::query(
            "INSERT INTO assignments (id, block_id, person_id, rotation_template_id, role, \
             activity_override, notes, override_reason, override_acknowledged_at, confidence, \
             score, created_by, created_at, updated_at, source) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)",
        )
        .bind(assignment.id)
        .bind(assignment.block_id)
        .bind(assignment.person_id)
        .bind(assignment.rotation_template_id)
        .bind(role_str(assignment.role))
        .bind(&assignment.activity_override)
        .bind(&assignment.notes)
        .bind(&assignment.override_reason)
        .bind(assignment.override_acknowledged_at)
        .bind(assignment.confidence)
        .bind(assignment.score)
        .bind(&assignment.created_by)
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .bind(source_str(assignment.source))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint().is_some() => {
                SccError::Conflict(format!("assignment already exists for block {} person {}", assignment.block_id, assignment.person_id))
            }
            _ => storage_err(e),
        })?;
        Ok(())
    }

    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
        expected_updated_at: DateTime<Utc>,
    ) -> SccResult<Assignment> {
        let row = sqlx::query("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| SccError::NotFound(format!("assignment {id}")))?;
        let mut current = row_to_assignment(&row)?;

        if current.updated_at != expected_updated_at {
            return Err(SccError::Conflict(format!("assignment {id} was modified concurrently")));
        }

        if let Some(v) = patch.rotation_template_id {
            current.rotation_template_id = v;
        }
        if let Some(v) = patch.role {
            current.role = v;
        }
        if let Some(v) = patch.activity_override {
            current.activity_override = v;
        }
        if let Some(v) = patch.notes {
            current.notes = v;
        }
        if let Some(v) = patch.override_reason {
            current.override_reason = v;
        }
        if let Some(v) = patch.override_acknowledged_at {
            current.override_acknowledged_at = v;
        }
        current.updated_at = Utc::now();

        sqlx::query(
            "UPDATE assignments SET rotation_template_id=$2, role=$3, activity_override=$4, \
             notes=$5, override_reason=$6, override_acknowledged_at=$7, updated_at=$8 WHERE id=$1",
        )
        .bind(current.id)
        .bind(current.rotation_template_id)
        .bind(role_str(current.role))
        .bind(&current.activity_override)
        .bind(&current.notes)
        .bind(&current.override_reason)
        .bind(current.override_acknowledged_at)
        .bind(current.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(current)
    }

    async fn delete_assignment(&self, id: Uuid) -> SccResult<()> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(SccError::NotFound(format!("assignment {id}")));
        }
        Ok(())
    }

    async fn find_assignment(&self, id: Uuid) -> SccResult<Option<Assignment>> {
        sqlx::query("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .as_ref()
            .map(row_to_assignment)
            .transpose()
    }

    async fn find_assignment_by_block_person(&self, block_id: Uuid, person_id: Uuid) -> SccResult<Option<Assignment>> {
        sqlx::query("SELECT * FROM assignments WHERE block_id = $1 AND person_id = $2")
            .bind(block_id)
            .bind(person_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .as_ref()
            .map(row_to_assignment)
            .transpose()
    }

    async fn find_person(&self, id: Uuid) -> SccResult<Option<Person>> {
        sqlx::query("SELECT * FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .as_ref()
            .map(row_to_person)
            .transpose()
    }

    async fn find_block(&self, id: Uuid) -> SccResult<Option<Block>> {
        sqlx::query("SELECT * FROM blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .as_ref()
            .map(row_to_block)
            .transpose()
    }

    // Each write above autocommits against the pool; a `TxToken` is
    // currently bookkeeping only.
    // TODO: hold a live `sqlx::Transaction` per token so `rollback` can
    // actually undo the writes a batch made since `begin_tx`.
    async fn begin_tx(&self) -> SccResult<TxToken> {
        Ok(TxToken(Uuid::new_v4()))
    }

    async fn commit(&self, _tx: TxToken) -> SccResult<()> {
        Ok(())
    }

    async fn rollback(&self, _tx: TxToken) -> SccResult<()> {
        Ok(())
    }
}

#[async_trait]
impl SwapRepository for PgStore {
    async fn find(&self, id: Uuid) -> SccResult<Option<SwapRecord>> {
        sqlx::query("SELECT * FROM swaps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .as_ref()
            .map(row_to_swap)
            .transpose()
    }

    async fn list_other_pending(&self, exclude_person_id: Uuid) -> SccResult<Vec<SwapRecord>> {
        sqlx::query("SELECT * FROM swaps WHERE status = 'PENDING' AND source_person_id != $1")
            .bind(exclude_person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .iter()
            .map(row_to_swap)
            .collect()
    }
}

fn storage_err(e: sqlx::Error) -> SccError {
    crate::error::StorageError::from(e).into()
}

fn role_str(role: AssignmentRole) -> &'static str {
    match role {
        AssignmentRole::Primary => "primary",
        AssignmentRole::Supervising => "supervising",
        AssignmentRole::Backup => "backup",
    }
}

fn source_str(source: AssignmentSource) -> &'static str {
    match source {
        AssignmentSource::Preload => "preload",
        AssignmentSource::Manual => "manual",
        AssignmentSource::Solver => "solver",
        AssignmentSource::Template => "template",
    }
}

fn parse_or_decode<T: FromStr>(value: &str, field: &str) -> SccResult<T> {
    value.parse().map_err(|_| SccError::Internal(format!("unrecognised {field}: {value}")))
}

fn row_to_person(row: &sqlx::postgres::PgRow) -> SccResult<Person> {
    let kind_str: String = row.get("kind");
    let admin_str: String = row.get("admin_type");
    Ok(Person {
        id: row.get("id"),
        name: row.get("name"),
        kind: match kind_str.as_str() {
            "resident" => PersonKind::Resident,
            "faculty" => PersonKind::Faculty,
            other => return Err(SccError::Internal(format!("unrecognised person kind: {other}"))),
        },
        pgy_level: row.try_get::<Option<i16>, _>("pgy_level").ok().flatten().map(|v| v as u8),
        email: row.get("email"),
        specialties: row.get::<Vec<String>, _>("specialties").into_iter().collect(),
        faculty_role: row.get("faculty_role"),
        is_program_director: row.get("is_program_director"),
        min_clinic_halfdays_per_week: row.get::<i16, _>("min_clinic_halfdays_per_week") as u8,
        max_clinic_halfdays_per_week: row.get::<i16, _>("max_clinic_halfdays_per_week") as u8,
        admin_type: match admin_str.as_str() {
            "GME" => AdminType::Gme,
            "DFM" => AdminType::Dfm,
            "SM" => AdminType::Sm,
            other => return Err(SccError::Internal(format!("unrecognised admin type: {other}"))),
        },
        sunday_call_count: row.get::<i32, _>("sunday_call_count") as u32,
        weekday_call_count: row.get::<i32, _>("weekday_call_count") as u32,
        fmit_weeks_count: row.get::<i32, _>("fmit_weeks_count") as u32,
        prefers_wednesday_call: row.get("prefers_wednesday_call"),
    })
}

fn row_to_block(row: &sqlx::postgres::PgRow) -> SccResult<Block> {
    let tod: String = row.get("time_of_day");
    Ok(Block {
        id: row.get("id"),
        date: row.get("date"),
        time_of_day: parse_time_of_day(&tod)?,
        block_number: row.get::<i16, _>("block_number") as u8,
        is_weekend: row.get("is_weekend"),
        is_holiday: row.get("is_holiday"),
        holiday_name: row.get("holiday_name"),
    })
}

fn parse_time_of_day(s: &str) -> SccResult<TimeOfDay> {
    match s {
        "am" => Ok(TimeOfDay::Am),
        "pm" => Ok(TimeOfDay::Pm),
        other => Err(SccError::Internal(format!("unrecognised time_of_day: {other}"))),
    }
}

fn row_to_template(row: &sqlx::postgres::PgRow) -> SccResult<RotationTemplate> {
    let activity: String = row.get("activity_type");
    let tod: Option<String> = row.get("time_of_day");
    Ok(RotationTemplate {
        id: row.get("id"),
        name: row.get("name"),
        abbreviation: row.get("abbreviation"),
        activity_type: match activity.as_str() {
            "clinic" => ActivityType::Clinic,
            "inpatient" => ActivityType::Inpatient,
            "procedure" => ActivityType::Procedure,
            "lecture" => ActivityType::Lecture,
            "call" => ActivityType::Call,
            "admin" => ActivityType::Admin,
            other => return Err(SccError::Internal(format!("unrecognised activity type: {other}"))),
        },
        allowed_person_types: row
            .get::<Vec<String>, _>("allowed_person_types")
            .into_iter()
            .map(|s| match s.as_str() {
                "resident" => Ok(PersonKind::Resident),
                "faculty" => Ok(PersonKind::Faculty),
                other => Err(SccError::Internal(format!("unrecognised person kind: {other}"))),
            })
            .collect::<SccResult<BTreeSet<_>>>()?,
        min_pgy_level: row.try_get::<Option<i16>, _>("min_pgy_level").ok().flatten().map(|v| v as u8),
        max_pgy_level: row.try_get::<Option<i16>, _>("max_pgy_level").ok().flatten().map(|v| v as u8),
        required_specialties: row.get::<Vec<String>, _>("required_specialties").into_iter().collect(),
        time_of_day: tod.map(|s| parse_time_of_day(&s)).transpose()?,
        counts_toward_physical_capacity: row.get("counts_toward_physical_capacity"),
        max_residents: row.try_get::<Option<i32>, _>("max_residents").ok().flatten().map(|v| v as u32),
        call_shift_hours: row.try_get::<Option<i32>, _>("call_shift_hours").ok().flatten().map(|v| v as u32),
    })
}

fn row_to_assignment(row: &sqlx::postgres::PgRow) -> SccResult<Assignment> {
    let role: String = row.get("role");
    let source: String = row.get("source");
    Ok(Assignment {
        id: row.get("id"),
        block_id: row.get("block_id"),
        person_id: row.get("person_id"),
        rotation_template_id: row.get("rotation_template_id"),
        role: parse_or_decode::<RoleWrapper>(&role, "assignment role")?.0,
        activity_override: row.get("activity_override"),
        notes: row.get("notes"),
        override_reason: row.get("override_reason"),
        override_acknowledged_at: row.get("override_acknowledged_at"),
        confidence: row.get("confidence"),
        score: row.get("score"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        source: parse_or_decode::<SourceWrapper>(&source, "assignment source")?.0,
    })
}

/// Thin `FromStr` wrappers so `parse_or_decode` can stay generic over enums
/// that don't otherwise need a `FromStr` impl in `scce_core`.
struct RoleWrapper(AssignmentRole);
impl FromStr for RoleWrapper {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(Self(match s {
            "primary" => AssignmentRole::Primary,
            "supervising" => AssignmentRole::Supervising,
            "backup" => AssignmentRole::Backup,
            _ => return Err(()),
        }))
    }
}

struct SourceWrapper(AssignmentSource);
impl FromStr for SourceWrapper {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(Self(match s {
            "preload" => AssignmentSource::Preload,
            "manual" => AssignmentSource::Manual,
            "solver" => AssignmentSource::Solver,
            "template" => AssignmentSource::Template,
            _ => return Err(()),
        }))
    }
}

fn row_to_absence(row: &sqlx::postgres::PgRow) -> SccResult<Absence> {
    let kind: String = row.get("absence_type");
    Ok(Absence {
        id: row.get("id"),
        person_id: row.get("person_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        absence_type: match kind.as_str() {
            "vacation" => AbsenceType::Vacation,
            "deployment" => AbsenceType::Deployment,
            "tdy" => AbsenceType::Tdy,
            "medical" => AbsenceType::Medical,
            other => return Err(SccError::Internal(format!("unrecognised absence type: {other}"))),
        },
        is_blocking: row.get("is_blocking"),
    })
}

fn row_to_inpatient_preload(row: &sqlx::postgres::PgRow) -> SccResult<InpatientPreload> {
    let kind: String = row.get("rotation_type");
    Ok(InpatientPreload {
        id: row.get("id"),
        person_id: row.get("person_id"),
        rotation_type: match kind.as_str() {
            "FMIT" => InpatientRotationType::Fmit,
            "NF" => InpatientRotationType::Nf,
            "PED_W" => InpatientRotationType::PedW,
            "PED_NF" => InpatientRotationType::PedNf,
            "KAP" => InpatientRotationType::Kap,
            "IM" => InpatientRotationType::Im,
            "LDNF" => InpatientRotationType::Ldnf,
            other => return Err(SccError::Internal(format!("unrecognised inpatient rotation type: {other}"))),
        },
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        fmit_week: row.try_get::<Option<i16>, _>("fmit_week").ok().flatten().map(|v| v as u8),
    })
}

fn row_to_call_preload(row: &sqlx::postgres::PgRow) -> SccResult<CallPreload> {
    let kind: String = row.get("call_type");
    Ok(CallPreload {
        id: row.get("id"),
        person_id: row.get("person_id"),
        call_date: row.get("call_date"),
        call_type: match kind.as_str() {
            "ld24hr" => CallType::Ld24Hr,
            "nf_coverage" => CallType::NfCoverage,
            "weekend" => CallType::Weekend,
            other => return Err(SccError::Internal(format!("unrecognised call type: {other}"))),
        },
    })
}

fn row_to_swap(row: &sqlx::postgres::PgRow) -> SccResult<SwapRecord> {
    let swap_type: String = row.get("swap_type");
    let status: String = row.get("status");
    Ok(SwapRecord {
        id: row.get("id"),
        source_person_id: row.get("source_person_id"),
        source_week_start: row.get("source_week_start"),
        target_person_id: row.get("target_person_id"),
        target_week_start: row.get("target_week_start"),
        swap_type: match swap_type.as_str() {
            "ONE_TO_ONE" => SwapType::OneToOne,
            "ABSORB" => SwapType::Absorb,
            other => return Err(SccError::Internal(format!("unrecognised swap type: {other}"))),
        },
        status: match status.as_str() {
            "PENDING" => SwapStatus::Pending,
            "APPROVED" => SwapStatus::Approved,
            "REJECTED" => SwapStatus::Rejected,
            "COMPLETED" => SwapStatus::Completed,
            other => return Err(SccError::Internal(format!("unrecognised swap status: {other}"))),
        },
        created_at: row.get("created_at"),
        faculty_preference_tags: row.get("faculty_preference_tags"),
    })
}
