pub mod story_handlers;
pub mod story_models;
