// Student side: the proficiency registry plus the browse, detail and saved
// views, all scored through `AppState::match_scorer`.

pub mod handlers;
pub mod models;
pub mod store;
