pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::cv::handlers as cv;
use crate::positions::handlers as positions;
use crate::state::AppState;
use crate::students::handlers as students;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalogue
        .route("/api/v1/skills", get(positions::handle_list_skills))
        .route("/api/v1/tags", get(positions::handle_list_tags))
        // Position authoring (admin)
        .route(
            "/api/v1/admin/positions",
            get(positions::handle_list_positions).post(positions::handle_create_position),
        )
        .route(
            "/api/v1/admin/positions/:id",
            get(positions::handle_get_position)
                .put(positions::handle_update_position)
                .delete(positions::handle_delete_position),
        )
        .route(
            "/api/v1/admin/positions/:id/available-skills",
            get(positions::handle_available_skills),
        )
        .route(
            "/api/v1/admin/positions/:id/requirements",
            post(positions::handle_add_requirement).patch(positions::handle_edit_requirements),
        )
        .route(
            "/api/v1/admin/positions/:id/review",
            get(positions::handle_review).post(positions::handle_review_submit),
        )
        .route(
            "/api/v1/admin/positions/:id/status",
            post(positions::handle_set_status),
        )
        .route("/api/v1/admin/skills", post(positions::handle_create_skill))
        .route("/api/v1/admin/tags", post(positions::handle_create_tag))
        // Student proficiency registry
        .route(
            "/api/v1/students/:student_id/skills",
            get(students::handle_list_skills)
                .post(students::handle_add_skill)
                .put(students::handle_bulk_save_skills),
        )
        .route(
            "/api/v1/students/:student_id/skills/:record_id",
            put(students::handle_update_skill)
                .patch(students::handle_update_skill)
                .delete(students::handle_delete_skill),
        )
        // Matching views
        .route(
            "/api/v1/students/:student_id/positions",
            get(students::handle_browse_positions),
        )
        .route(
            "/api/v1/students/:student_id/positions/:position_id",
            get(students::handle_position_detail),
        )
        .route(
            "/api/v1/students/:student_id/saved",
            get(students::handle_saved_positions).post(students::handle_toggle_saved),
        )
        // CV
        .route(
            "/api/v1/students/:student_id/cv",
            get(cv::handle_get_cv).put(cv::handle_save_cv),
        )
        .with_state(state)
}
