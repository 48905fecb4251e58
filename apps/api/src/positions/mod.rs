// Position authoring: skills, tags, positions and their weighted requirements.
// Admin-only CRUD. Scores are never computed here; see `matching`.

pub mod handlers;
pub mod models;
pub mod store;
