pub mod slides;
pub mod slides_api;
