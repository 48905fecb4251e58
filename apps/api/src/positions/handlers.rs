//! Axum route handlers for position authoring (admin side).
//!
//! Flow mirrors the authoring wizard: create/edit the position, attach
//! weighted skill requirements, review normalised weights, then post.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::{requirement_weights, Proficiency};
use crate::positions::models::{
    to_requirements, PositionRow, PositionStatus, RequirementRow, SkillCategory, SkillRow, TagRow,
};
use crate::positions::store::{self, PositionParams, RequirementChange};
use crate::state::AppState;

const MIN_IMPORTANCE: i64 = 1;
const MAX_IMPORTANCE: i64 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PositionListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PositionListResponse {
    pub positions: Vec<PositionRow>,
    pub current_status: Option<PositionStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PositionStatus,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PositionDetailResponse {
    pub position: PositionRow,
    pub tags: Vec<TagRow>,
    pub requirements: Vec<RequirementRow>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequirementRequest {
    pub skill_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementEdit {
    pub requirement_id: Uuid,
    #[serde(default)]
    pub delete: bool,
    /// low/medium/high; unknown values leave the level unchanged.
    pub proficiency: Option<String>,
    pub importance: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequirementsRequest {
    pub edits: Vec<RequirementEdit>,
}

#[derive(Debug, Serialize)]
pub struct WeightedRequirement {
    #[serde(flatten)]
    pub requirement: RequirementRow,
    pub weight_norm: f64,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub position: PositionRow,
    pub requirements: Vec<WeightedRequirement>,
    pub total_importance: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmitRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/positions?status=
///
/// An unrecognised status is ignored rather than rejected.
pub async fn handle_list_positions(
    State(state): State<AppState>,
    Query(query): Query<PositionListQuery>,
) -> Result<Json<PositionListResponse>, AppError> {
    let status = query.status.as_deref().and_then(|s| s.parse().ok());
    let positions = store::list_positions(&state.db, status).await?;
    Ok(Json(PositionListResponse {
        positions,
        current_status: status,
    }))
}

/// POST /api/v1/admin/positions
pub async fn handle_create_position(
    State(state): State<AppState>,
    Json(req): Json<PositionRequest>,
) -> Result<(StatusCode, Json<PositionRow>), AppError> {
    validate_position_request(&req)?;
    let position = store::create_position(&state.db, position_params(&req)).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

/// GET /api/v1/admin/positions/:id
pub async fn handle_get_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> Result<Json<PositionDetailResponse>, AppError> {
    let position = store::get_position(&state.db, position_id).await?;
    let tags = store::get_position_tags(&state.db, position_id).await?;
    let requirements = store::get_requirements(&state.db, position_id).await?;
    Ok(Json(PositionDetailResponse {
        position,
        tags,
        requirements,
    }))
}

/// PUT /api/v1/admin/positions/:id
pub async fn handle_update_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<PositionRow>, AppError> {
    validate_position_request(&req)?;
    let position = store::update_position(&state.db, position_id, position_params(&req)).await?;
    Ok(Json(position))
}

/// DELETE /api/v1/admin/positions/:id
pub async fn handle_delete_position(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_position(&state.db, position_id).await? {
        return Err(AppError::NotFound(format!("Position {position_id} not found")));
    }
    info!("Deleted position {position_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/positions/:id/available-skills
pub async fn handle_available_skills(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    store::get_position(&state.db, position_id).await?;
    Ok(Json(
        store::get_available_skills(&state.db, position_id).await?,
    ))
}

/// POST /api/v1/admin/positions/:id/requirements
pub async fn handle_add_requirement(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(req): Json<AddRequirementRequest>,
) -> Result<Json<RequirementRow>, AppError> {
    store::get_position(&state.db, position_id).await?;
    let requirement = store::add_requirement(&state.db, position_id, req.skill_id).await?;
    Ok(Json(requirement))
}

/// PATCH /api/v1/admin/positions/:id/requirements
///
/// Deletes, re-levels and re-weights requirements in one transaction and
/// returns the resulting requirement list.
pub async fn handle_edit_requirements(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(req): Json<EditRequirementsRequest>,
) -> Result<Json<Vec<RequirementRow>>, AppError> {
    let existing = store::get_requirements(&state.db, position_id).await?;
    let changes = resolve_requirement_edits(&existing, &req.edits);
    store::apply_requirement_changes(&state.db, position_id, &changes).await?;
    Ok(Json(store::get_requirements(&state.db, position_id).await?))
}

/// GET /api/v1/admin/positions/:id/review
pub async fn handle_review(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, AppError> {
    let position = store::get_position(&state.db, position_id).await?;
    let rows = store::get_requirements(&state.db, position_id).await?;
    Ok(Json(build_review(position, rows)))
}

/// POST /api/v1/admin/positions/:id/review
///
/// `action = "post"` publishes the position; anything else saves it as a draft.
pub async fn handle_review_submit(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(req): Json<ReviewSubmitRequest>,
) -> Result<Json<PositionRow>, AppError> {
    let status = if req.action == "post" {
        PositionStatus::Posted
    } else {
        PositionStatus::Draft
    };
    Ok(Json(
        store::set_status(&state.db, position_id, status).await?,
    ))
}

/// POST /api/v1/admin/positions/:id/status
///
/// Unknown statuses leave the position unchanged.
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(position_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<PositionRow>, AppError> {
    let position = match req.status.parse::<PositionStatus>() {
        Ok(status) => store::set_status(&state.db, position_id, status).await?,
        Err(e) => {
            warn!("Ignoring status change for position {position_id}: {e}");
            store::get_position(&state.db, position_id).await?
        }
    };
    Ok(Json(position))
}

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    Ok(Json(store::list_skills(&state.db).await?))
}

/// POST /api/v1/admin/skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    let name = required_name(&req.name, "Skill")?;
    let skill = store::create_skill(&state.db, name, req.category).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// GET /api/v1/tags
pub async fn handle_list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagRow>>, AppError> {
    Ok(Json(store::list_tags(&state.db).await?))
}

/// POST /api/v1/admin/tags
pub async fn handle_create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagRow>), AppError> {
    let name = required_name(&req.name, "Tag")?;
    let tag = store::create_tag(&state.db, name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn validate_position_request(req: &PositionRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.company.trim().is_empty() {
        return Err(AppError::Validation("company cannot be empty".to_string()));
    }
    Ok(())
}

fn position_params(req: &PositionRequest) -> PositionParams<'_> {
    PositionParams {
        title: req.title.trim(),
        company: req.company.trim(),
        description: &req.description,
        status: req.status,
        tag_ids: &req.tag_ids,
    }
}

fn required_name<'a>(name: &'a str, kind: &str) -> Result<&'a str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{kind} name cannot be empty")));
    }
    Ok(name)
}

/// Turns client edits into concrete changes against the stored requirements.
/// Edits for requirements not on this position are dropped.
pub fn resolve_requirement_edits(
    existing: &[RequirementRow],
    edits: &[RequirementEdit],
) -> Vec<(Uuid, RequirementChange)> {
    let mut changes = Vec::new();

    for row in existing {
        let Some(edit) = edits.iter().find(|e| e.requirement_id == row.id) else {
            continue;
        };

        if edit.delete {
            changes.push((row.id, RequirementChange::Delete));
            continue;
        }

        let level_pct = edit
            .proficiency
            .as_deref()
            .and_then(|p| p.parse::<Proficiency>().ok())
            .map(|p| p.capability() as i32)
            .unwrap_or(row.level_pct);

        let importance = edit
            .importance
            .map(|i| i.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE) as i16)
            .unwrap_or(row.importance);

        changes.push((
            row.id,
            RequirementChange::Update {
                level_pct,
                importance,
            },
        ));
    }

    changes
}

/// Attaches each requirement's share of the total importance, rounded to one decimal.
pub fn build_review(position: PositionRow, rows: Vec<RequirementRow>) -> ReviewResponse {
    let requirements = to_requirements(&rows);
    let total_importance = requirements.iter().map(|r| r.importance as u64).sum();
    let weights = requirement_weights(&requirements);

    ReviewResponse {
        position,
        requirements: rows
            .into_iter()
            .zip(weights)
            .map(|(requirement, weight)| WeightedRequirement {
                requirement,
                weight_norm: (weight * 10.0).round() / 10.0,
            })
            .collect(),
        total_importance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_row(level_pct: i32, importance: i16) -> RequirementRow {
        RequirementRow {
            id: Uuid::new_v4(),
            position_id: Uuid::nil(),
            skill_id: Uuid::new_v4(),
            skill_name: "Rust".to_string(),
            level_pct,
            importance,
        }
    }

    fn make_position() -> PositionRow {
        PositionRow {
            id: Uuid::nil(),
            title: "Backend Intern".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            status: "draft".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn edit(requirement_id: Uuid) -> RequirementEdit {
        RequirementEdit {
            requirement_id,
            delete: false,
            proficiency: None,
            importance: None,
        }
    }

    #[test]
    fn test_edit_maps_proficiency_to_level() {
        let row = make_row(50, 2);
        let edits = vec![RequirementEdit {
            proficiency: Some("high".to_string()),
            ..edit(row.id)
        }];
        let changes = resolve_requirement_edits(&[row.clone()], &edits);
        assert_eq!(
            changes,
            vec![(
                row.id,
                RequirementChange::Update {
                    level_pct: 100,
                    importance: 2
                }
            )]
        );
    }

    #[test]
    fn test_edit_ignores_unknown_proficiency() {
        let row = make_row(60, 1);
        let edits = vec![RequirementEdit {
            proficiency: Some("expert".to_string()),
            ..edit(row.id)
        }];
        let changes = resolve_requirement_edits(&[row.clone()], &edits);
        assert_eq!(
            changes[0].1,
            RequirementChange::Update {
                level_pct: 60,
                importance: 1
            }
        );
    }

    #[test]
    fn test_edit_clamps_importance() {
        let high = make_row(75, 3);
        let low = make_row(75, 3);
        let edits = vec![
            RequirementEdit {
                importance: Some(9),
                ..edit(high.id)
            },
            RequirementEdit {
                importance: Some(-2),
                ..edit(low.id)
            },
        ];
        let changes = resolve_requirement_edits(&[high, low], &edits);
        assert!(matches!(
            changes[0].1,
            RequirementChange::Update { importance: 5, .. }
        ));
        assert!(matches!(
            changes[1].1,
            RequirementChange::Update { importance: 1, .. }
        ));
    }

    #[test]
    fn test_edit_delete_wins_over_updates() {
        let row = make_row(75, 3);
        let edits = vec![RequirementEdit {
            delete: true,
            importance: Some(4),
            ..edit(row.id)
        }];
        let changes = resolve_requirement_edits(&[row.clone()], &edits);
        assert_eq!(changes, vec![(row.id, RequirementChange::Delete)]);
    }

    #[test]
    fn test_edit_for_foreign_requirement_is_dropped() {
        let row = make_row(75, 3);
        let changes = resolve_requirement_edits(&[row], &[edit(Uuid::new_v4())]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_review_weights_round_to_one_decimal() {
        let rows = vec![make_row(75, 1), make_row(75, 2)];
        let review = build_review(make_position(), rows);
        assert_eq!(review.total_importance, 3);
        assert_eq!(review.requirements[0].weight_norm, 33.3);
        assert_eq!(review.requirements[1].weight_norm, 66.7);
    }

    #[test]
    fn test_review_without_requirements() {
        let review = build_review(make_position(), vec![]);
        assert_eq!(review.total_importance, 0);
        assert!(review.requirements.is_empty());
    }

    #[test]
    fn test_required_name_trims_and_rejects_blank() {
        assert_eq!(required_name("  Rust ", "Skill").unwrap(), "Rust");
        assert!(matches!(
            required_name("   ", "Tag"),
            Err(AppError::Validation(_))
        ));
    }
}
