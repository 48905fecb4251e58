//! Axum route handlers for the student side: the proficiency registry and the
//! three views that display match scores (browse, detail, saved).

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::{
    format_score, scorer::RequirementMatch, MatchScorer, Proficiency, ProficiencyRegistry,
};
use crate::positions::models::{
    to_requirements, PositionRow, PositionStatus, RequirementRow, SkillRow,
};
use crate::positions::store as position_store;
use crate::state::AppState;
use crate::students::models::{SaveAction, StudentSkillRow};
use crate::students::store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StudentSkillsResponse {
    pub current_skills: Vec<StudentSkillRow>,
    pub available_skills: Vec<SkillRow>,
    pub proficiency_vals: Vec<Proficiency>,
}

#[derive(Debug, Deserialize)]
pub struct AddSkillRequest {
    pub skill_id: Uuid,
    pub proficiency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkillRequest {
    pub proficiency: String,
}

#[derive(Debug, Serialize)]
pub struct PositionMatch {
    pub position: PositionRow,
    pub match_score: f64,
    pub score_display: String,
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct RequirementDetail {
    pub requirement_id: Uuid,
    pub skill_name: String,
    #[serde(flatten)]
    pub detail: RequirementMatch,
}

#[derive(Debug, Serialize)]
pub struct PositionMatchDetail {
    pub position: PositionRow,
    pub requirements: Vec<RequirementDetail>,
    pub match_score: f64,
    pub score_display: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleSaveRequest {
    pub position_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleSaveResponse {
    pub action: SaveAction,
    pub position_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SavedPositionMatch {
    pub position: PositionRow,
    pub saved_at: DateTime<Utc>,
    pub match_score: f64,
    pub score_display: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Skill registry handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/students/:student_id/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentSkillsResponse>, AppError> {
    let current_skills = store::list_student_skills(&state.db, student_id).await?;
    let available_skills = store::get_available_skills(&state.db, student_id).await?;
    Ok(Json(StudentSkillsResponse {
        current_skills,
        available_skills,
        proficiency_vals: Proficiency::ALL.to_vec(),
    }))
}

/// POST /api/v1/students/:student_id/skills
///
/// Proficiency defaults to medium when omitted.
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(req): Json<AddSkillRequest>,
) -> Result<Json<StudentSkillRow>, AppError> {
    let proficiency = match req.proficiency.as_deref() {
        None => Proficiency::Medium,
        Some(raw) => parse_proficiency(raw)?,
    };
    let row = store::add_student_skill(&state.db, student_id, req.skill_id, proficiency).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/students/:student_id/skills/:record_id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path((student_id, record_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateSkillRequest>,
) -> Result<StatusCode, AppError> {
    let proficiency = parse_proficiency(&req.proficiency)?;
    store::update_student_skill(&state.db, student_id, record_id, proficiency).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/students/:student_id/skills/:record_id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path((student_id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    store::delete_student_skill(&state.db, student_id, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/students/:student_id/skills
///
/// Body maps record id → proficiency. Invalid proficiencies are skipped.
pub async fn handle_bulk_save_skills(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(req): Json<HashMap<Uuid, String>>,
) -> Result<StatusCode, AppError> {
    let updates = resolve_bulk_updates(&req);
    store::bulk_update_student_skills(&state.db, student_id, &updates).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Matching views
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/students/:student_id/positions
///
/// Posted positions, newest first, each scored against the student's registry.
pub async fn handle_browse_positions(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<PositionMatch>>, AppError> {
    let registry = store::load_registry(&state.db, student_id).await?;
    let saved_ids = store::saved_position_ids(&state.db, student_id).await?;
    let positions = position_store::list_positions(&state.db, Some(PositionStatus::Posted)).await?;

    let ids: Vec<Uuid> = positions.iter().map(|p| p.id).collect();
    let requirements = position_store::get_requirements_for_positions(&state.db, &ids).await?;

    let matches = positions
        .into_iter()
        .map(|position| {
            let rows = requirements
                .get(&position.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let match_score = score_rows(state.match_scorer.as_ref(), &registry, rows);
            PositionMatch {
                saved: saved_ids.contains(&position.id),
                position,
                match_score,
                score_display: format_score(match_score),
            }
        })
        .collect();

    Ok(Json(matches))
}

/// GET /api/v1/students/:student_id/positions/:position_id
///
/// Per-requirement breakdown. Drafts and deleted positions are hidden from students.
pub async fn handle_position_detail(
    State(state): State<AppState>,
    Path((student_id, position_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PositionMatchDetail>, AppError> {
    let position = position_store::get_position(&state.db, position_id).await?;
    if !visible_to_students(&position.status) {
        return Err(AppError::NotFound(format!("Position {position_id} not found")));
    }

    let rows = position_store::get_requirements(&state.db, position_id).await?;
    let registry = store::load_registry(&state.db, student_id).await?;

    Ok(Json(build_detail(
        state.match_scorer.as_ref(),
        &registry,
        position,
        rows,
    )))
}

/// POST /api/v1/students/:student_id/saved
pub async fn handle_toggle_saved(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(req): Json<ToggleSaveRequest>,
) -> Result<Json<ToggleSaveResponse>, AppError> {
    position_store::get_position(&state.db, req.position_id).await?;
    let action = store::toggle_saved_position(&state.db, student_id, req.position_id).await?;
    Ok(Json(ToggleSaveResponse {
        action,
        position_id: req.position_id,
    }))
}

/// GET /api/v1/students/:student_id/saved
pub async fn handle_saved_positions(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<SavedPositionMatch>>, AppError> {
    let registry = store::load_registry(&state.db, student_id).await?;
    let saved = store::list_saved_positions(&state.db, student_id).await?;

    let ids: Vec<Uuid> = saved.iter().map(|s| s.position.id).collect();
    let requirements = position_store::get_requirements_for_positions(&state.db, &ids).await?;

    let matches = saved
        .into_iter()
        .map(|s| {
            let rows = requirements
                .get(&s.position.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let match_score = score_rows(state.match_scorer.as_ref(), &registry, rows);
            SavedPositionMatch {
                position: s.position,
                saved_at: s.saved_at,
                match_score,
                score_display: format_score(match_score),
            }
        })
        .collect();

    Ok(Json(matches))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_proficiency(raw: &str) -> Result<Proficiency, AppError> {
    raw.parse::<Proficiency>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn resolve_bulk_updates(req: &HashMap<Uuid, String>) -> Vec<(Uuid, Proficiency)> {
    req.iter()
        .filter_map(|(record_id, raw)| match raw.parse::<Proficiency>() {
            Ok(p) => Some((*record_id, p)),
            Err(e) => {
                warn!("Skipping bulk update for skill record {record_id}: {e}");
                None
            }
        })
        .collect()
}

fn visible_to_students(status: &str) -> bool {
    matches!(
        status.parse::<PositionStatus>(),
        Ok(PositionStatus::Posted | PositionStatus::Retracted)
    )
}

fn score_rows(
    scorer: &dyn MatchScorer,
    registry: &ProficiencyRegistry,
    rows: &[RequirementRow],
) -> f64 {
    scorer.score(registry, &to_requirements(rows))
}

fn build_detail(
    scorer: &dyn MatchScorer,
    registry: &ProficiencyRegistry,
    position: PositionRow,
    rows: Vec<RequirementRow>,
) -> PositionMatchDetail {
    let breakdown = scorer.breakdown(registry, &to_requirements(&rows));

    // Breakdown lines come back in requirement order.
    let requirements = rows
        .into_iter()
        .zip(breakdown.requirements)
        .map(|(row, detail)| RequirementDetail {
            requirement_id: row.id,
            skill_name: row.skill_name,
            detail,
        })
        .collect();

    PositionMatchDetail {
        position,
        requirements,
        match_score: breakdown.score,
        score_display: breakdown.score_display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::WeightedMatchScorer;

    fn make_position(status: &str) -> PositionRow {
        PositionRow {
            id: Uuid::new_v4(),
            title: "Data Analyst".to_string(),
            company: "Globex".to_string(),
            description: String::new(),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_row(skill_id: Uuid, name: &str, level_pct: i32, importance: i16) -> RequirementRow {
        RequirementRow {
            id: Uuid::new_v4(),
            position_id: Uuid::nil(),
            skill_id,
            skill_name: name.to_string(),
            level_pct,
            importance,
        }
    }

    #[test]
    fn test_detail_pairs_names_with_breakdown() {
        let sql = Uuid::new_v4();
        let python = Uuid::new_v4();
        let registry: ProficiencyRegistry = [(sql, Proficiency::High)].into_iter().collect();
        let rows = vec![
            make_row(sql, "SQL", 75, 1),
            make_row(python, "Python", 100, 3),
        ];

        let detail = build_detail(&WeightedMatchScorer, &registry, make_position("posted"), rows);
        assert_eq!(detail.requirements.len(), 2);
        assert_eq!(detail.requirements[0].skill_name, "SQL");
        assert_eq!(detail.requirements[0].detail.student_label, "High");
        assert_eq!(detail.requirements[1].skill_name, "Python");
        assert_eq!(detail.requirements[1].detail.student_label, "None");
        assert!((detail.match_score - 25.0).abs() < 1e-9);
        assert_eq!(detail.score_display, "25.0");
    }

    #[test]
    fn test_score_rows_without_requirements_is_zero() {
        let registry = ProficiencyRegistry::new();
        assert_eq!(score_rows(&WeightedMatchScorer, &registry, &[]), 0.0);
    }

    #[test]
    fn test_bulk_updates_skip_invalid_values() {
        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let req = HashMap::from([
            (good, "high".to_string()),
            (bad, "legendary".to_string()),
        ]);
        let updates = resolve_bulk_updates(&req);
        assert_eq!(updates, vec![(good, Proficiency::High)]);
    }

    #[test]
    fn test_parse_proficiency_rejects_unknown() {
        assert!(matches!(
            parse_proficiency("none"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(parse_proficiency("low").unwrap(), Proficiency::Low);
    }

    #[test]
    fn test_visibility_by_status() {
        assert!(visible_to_students("posted"));
        assert!(visible_to_students("retracted"));
        assert!(!visible_to_students("draft"));
        assert!(!visible_to_students("deleted"));
        assert!(!visible_to_students("bogus"));
    }
}
