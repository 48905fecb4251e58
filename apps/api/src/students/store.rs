//! Persistence for a student's proficiency registry and saved positions.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::{Proficiency, ProficiencyRegistry};
use crate::positions::models::SkillRow;
use crate::students::models::{registry_from_rows, SaveAction, SavedPositionRow, StudentSkillRow};

const STUDENT_SKILL_SELECT: &str = r#"
    SELECT ss.id, ss.student_id, ss.skill_id, s.name AS skill_name, ss.proficiency
    FROM student_skills ss
    JOIN skills s ON s.id = ss.skill_id
"#;

/// Creates the student profile on first write; a no-op afterwards.
pub async fn ensure_student(pool: &PgPool, student_id: Uuid) -> Result<(), AppError> {
    sqlx::query("INSERT INTO students (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Proficiency registry
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_student_skills(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<StudentSkillRow>, AppError> {
    Ok(sqlx::query_as::<_, StudentSkillRow>(&format!(
        "{STUDENT_SKILL_SELECT} WHERE ss.student_id = $1 ORDER BY s.name"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await?)
}

/// Snapshot of the student's registry for scoring.
pub async fn load_registry(pool: &PgPool, student_id: Uuid) -> Result<ProficiencyRegistry, AppError> {
    let rows = list_student_skills(pool, student_id).await?;
    Ok(registry_from_rows(&rows))
}

/// Skills the student has not recorded yet.
pub async fn get_available_skills(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<SkillRow>, AppError> {
    Ok(sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT * FROM skills
        WHERE id NOT IN (SELECT skill_id FROM student_skills WHERE student_id = $1)
        ORDER BY name
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?)
}

/// Get-or-create: an existing record keeps its current proficiency.
pub async fn add_student_skill(
    pool: &PgPool,
    student_id: Uuid,
    skill_id: Uuid,
    proficiency: Proficiency,
) -> Result<StudentSkillRow, AppError> {
    ensure_student(pool, student_id).await?;

    sqlx::query(
        r#"
        INSERT INTO student_skills (id, student_id, skill_id, proficiency)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (student_id, skill_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(skill_id)
    .bind(proficiency.as_str())
    .execute(pool)
    .await?;

    Ok(sqlx::query_as::<_, StudentSkillRow>(&format!(
        "{STUDENT_SKILL_SELECT} WHERE ss.student_id = $1 AND ss.skill_id = $2"
    ))
    .bind(student_id)
    .bind(skill_id)
    .fetch_one(pool)
    .await?)
}

pub async fn update_student_skill(
    pool: &PgPool,
    student_id: Uuid,
    record_id: Uuid,
    proficiency: Proficiency,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE student_skills SET proficiency = $3 WHERE id = $1 AND student_id = $2",
    )
    .bind(record_id)
    .bind(student_id)
    .bind(proficiency.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Skill record {record_id} not found")));
    }
    Ok(())
}

pub async fn delete_student_skill(
    pool: &PgPool,
    student_id: Uuid,
    record_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM student_skills WHERE id = $1 AND student_id = $2")
        .bind(record_id)
        .bind(student_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Skill record {record_id} not found")));
    }
    Ok(())
}

/// Applies all updates or none: a record that does not belong to the student
/// rolls the whole batch back.
pub async fn bulk_update_student_skills(
    pool: &PgPool,
    student_id: Uuid,
    updates: &[(Uuid, Proficiency)],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for (record_id, proficiency) in updates {
        let result = sqlx::query(
            "UPDATE student_skills SET proficiency = $3 WHERE id = $1 AND student_id = $2",
        )
        .bind(record_id)
        .bind(student_id)
        .bind(proficiency.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Skill record {record_id} not found")));
        }
    }

    tx.commit().await?;
    info!(
        "Bulk-updated {} skill record(s) for student {student_id}",
        updates.len()
    );
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Saved positions
// ────────────────────────────────────────────────────────────────────────────

pub async fn saved_position_ids(pool: &PgPool, student_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
    let ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT position_id FROM saved_positions WHERE student_id = $1")
            .bind(student_id)
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().collect())
}

/// Saves the position, or un-saves it when it was already saved.
pub async fn toggle_saved_position(
    pool: &PgPool,
    student_id: Uuid,
    position_id: Uuid,
) -> Result<SaveAction, AppError> {
    ensure_student(pool, student_id).await?;

    let removed = sqlx::query(
        "DELETE FROM saved_positions WHERE student_id = $1 AND position_id = $2",
    )
    .bind(student_id)
    .bind(position_id)
    .execute(pool)
    .await?;

    if removed.rows_affected() > 0 {
        return Ok(SaveAction::Removed);
    }

    sqlx::query(
        r#"
        INSERT INTO saved_positions (id, student_id, position_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (student_id, position_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(position_id)
    .execute(pool)
    .await?;

    Ok(SaveAction::Added)
}

/// Saved positions, most recently saved first.
pub async fn list_saved_positions(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<SavedPositionRow>, AppError> {
    Ok(sqlx::query_as::<_, SavedPositionRow>(
        r#"
        SELECT p.*, sp.saved_at
        FROM saved_positions sp
        JOIN positions p ON p.id = sp.position_id
        WHERE sp.student_id = $1
        ORDER BY sp.saved_at DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?)
}
