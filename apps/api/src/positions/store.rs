//! Persistence for skills, tags, positions and position requirements.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::positions::models::{
    PositionRow, PositionStatus, RequirementRow, SkillCategory, SkillRow, TagRow,
};

/// Level and importance given to a requirement added without explicit values.
pub const DEFAULT_REQUIREMENT_LEVEL_PCT: i32 = 75;
pub const DEFAULT_REQUIREMENT_IMPORTANCE: i16 = 3;

const REQUIREMENT_SELECT: &str = r#"
    SELECT r.id, r.position_id, r.skill_id, s.name AS skill_name, r.level_pct, r.importance
    FROM position_requirements r
    JOIN skills s ON s.id = r.skill_id
"#;

/// Fields shared by position create and update.
pub struct PositionParams<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub description: &'a str,
    pub status: PositionStatus,
    pub tag_ids: &'a [Uuid],
}

// ────────────────────────────────────────────────────────────────────────────
// Skills & tags
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_skills(pool: &PgPool) -> Result<Vec<SkillRow>, AppError> {
    Ok(
        sqlx::query_as::<_, SkillRow>("SELECT * FROM skills ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn create_skill(
    pool: &PgPool,
    name: &str,
    category: SkillCategory,
) -> Result<SkillRow, AppError> {
    let skill = sqlx::query_as::<_, SkillRow>(
        "INSERT INTO skills (id, name, category) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(category.as_str())
    .fetch_one(pool)
    .await?;

    info!("Created skill {} ({})", skill.name, skill.id);
    Ok(skill)
}

pub async fn list_tags(pool: &PgPool) -> Result<Vec<TagRow>, AppError> {
    Ok(
        sqlx::query_as::<_, TagRow>("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn create_tag(pool: &PgPool, name: &str) -> Result<TagRow, AppError> {
    Ok(sqlx::query_as::<_, TagRow>(
        "INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Positions
// ────────────────────────────────────────────────────────────────────────────

/// All positions newest first, optionally restricted to one status.
pub async fn list_positions(
    pool: &PgPool,
    status: Option<PositionStatus>,
) -> Result<Vec<PositionRow>, AppError> {
    Ok(sqlx::query_as::<_, PositionRow>(
        r#"
        SELECT * FROM positions
        WHERE $1::TEXT IS NULL OR status = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(status.map(PositionStatus::as_str))
    .fetch_all(pool)
    .await?)
}

pub async fn get_position(pool: &PgPool, position_id: Uuid) -> Result<PositionRow, AppError> {
    sqlx::query_as::<_, PositionRow>("SELECT * FROM positions WHERE id = $1")
        .bind(position_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Position {position_id} not found")))
}

pub async fn create_position(
    pool: &PgPool,
    params: PositionParams<'_>,
) -> Result<PositionRow, AppError> {
    let mut tx = pool.begin().await?;

    let position = sqlx::query_as::<_, PositionRow>(
        r#"
        INSERT INTO positions (id, title, company, description, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(params.title)
    .bind(params.company)
    .bind(params.description)
    .bind(params.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    replace_tags(&mut tx, position.id, params.tag_ids).await?;
    tx.commit().await?;

    info!("Created position {} ({})", position.title, position.id);
    Ok(position)
}

pub async fn update_position(
    pool: &PgPool,
    position_id: Uuid,
    params: PositionParams<'_>,
) -> Result<PositionRow, AppError> {
    let mut tx = pool.begin().await?;

    let position = sqlx::query_as::<_, PositionRow>(
        r#"
        UPDATE positions
        SET title = $2, company = $3, description = $4, status = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(position_id)
    .bind(params.title)
    .bind(params.company)
    .bind(params.description)
    .bind(params.status.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Position {position_id} not found")))?;

    replace_tags(&mut tx, position_id, params.tag_ids).await?;
    tx.commit().await?;

    Ok(position)
}

async fn replace_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    position_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM position_tags WHERE position_id = $1")
        .bind(position_id)
        .execute(&mut **tx)
        .await?;

    if !tag_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO position_tags (position_id, tag_id)
            SELECT $1, UNNEST($2::UUID[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(position_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn set_status(
    pool: &PgPool,
    position_id: Uuid,
    status: PositionStatus,
) -> Result<PositionRow, AppError> {
    sqlx::query_as::<_, PositionRow>(
        "UPDATE positions SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(position_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Position {position_id} not found")))
}

/// Returns false when the position did not exist.
pub async fn delete_position(pool: &PgPool, position_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM positions WHERE id = $1")
        .bind(position_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_position_tags(pool: &PgPool, position_id: Uuid) -> Result<Vec<TagRow>, AppError> {
    Ok(sqlx::query_as::<_, TagRow>(
        r#"
        SELECT t.* FROM tags t
        JOIN position_tags pt ON pt.tag_id = t.id
        WHERE pt.position_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(position_id)
    .fetch_all(pool)
    .await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Requirements
// ────────────────────────────────────────────────────────────────────────────

pub async fn get_requirements(
    pool: &PgPool,
    position_id: Uuid,
) -> Result<Vec<RequirementRow>, AppError> {
    Ok(sqlx::query_as::<_, RequirementRow>(&format!(
        "{REQUIREMENT_SELECT} WHERE r.position_id = $1 ORDER BY s.name"
    ))
    .bind(position_id)
    .fetch_all(pool)
    .await?)
}

/// Requirements for many positions in one round trip, grouped by position.
pub async fn get_requirements_for_positions(
    pool: &PgPool,
    position_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<RequirementRow>>, AppError> {
    if position_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, RequirementRow>(&format!(
        "{REQUIREMENT_SELECT} WHERE r.position_id = ANY($1) ORDER BY s.name"
    ))
    .bind(position_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<RequirementRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.position_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Skills the position does not require yet.
pub async fn get_available_skills(
    pool: &PgPool,
    position_id: Uuid,
) -> Result<Vec<SkillRow>, AppError> {
    Ok(sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT * FROM skills
        WHERE id NOT IN (SELECT skill_id FROM position_requirements WHERE position_id = $1)
        ORDER BY name
        "#,
    )
    .bind(position_id)
    .fetch_all(pool)
    .await?)
}

/// Get-or-create: an existing requirement for the same skill is returned untouched.
pub async fn add_requirement(
    pool: &PgPool,
    position_id: Uuid,
    skill_id: Uuid,
) -> Result<RequirementRow, AppError> {
    sqlx::query(
        r#"
        INSERT INTO position_requirements (id, position_id, skill_id, level_pct, importance)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (position_id, skill_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(position_id)
    .bind(skill_id)
    .bind(DEFAULT_REQUIREMENT_LEVEL_PCT)
    .bind(DEFAULT_REQUIREMENT_IMPORTANCE)
    .execute(pool)
    .await?;

    Ok(sqlx::query_as::<_, RequirementRow>(&format!(
        "{REQUIREMENT_SELECT} WHERE r.position_id = $1 AND r.skill_id = $2"
    ))
    .bind(position_id)
    .bind(skill_id)
    .fetch_one(pool)
    .await?)
}

/// One resolved edit for an existing requirement.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementChange {
    Delete,
    Update { level_pct: i32, importance: i16 },
}

/// Applies resolved edits in a single transaction.
pub async fn apply_requirement_changes(
    pool: &PgPool,
    position_id: Uuid,
    changes: &[(Uuid, RequirementChange)],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for (requirement_id, change) in changes {
        match change {
            RequirementChange::Delete => {
                sqlx::query("DELETE FROM position_requirements WHERE id = $1 AND position_id = $2")
                    .bind(requirement_id)
                    .bind(position_id)
                    .execute(&mut *tx)
                    .await?;
            }
            RequirementChange::Update {
                level_pct,
                importance,
            } => {
                sqlx::query(
                    r#"
                    UPDATE position_requirements
                    SET level_pct = $3, importance = $4
                    WHERE id = $1 AND position_id = $2
                    "#,
                )
                .bind(requirement_id)
                .bind(position_id)
                .bind(level_pct)
                .bind(importance)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    info!(
        "Applied {} requirement change(s) to position {position_id}",
        changes.len()
    );
    Ok(())
}
