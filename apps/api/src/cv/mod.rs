// CV authoring: one CV per student with experience and language lists.
// Persistence and validation only; rendering is left to clients.

pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;
