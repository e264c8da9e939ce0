//! Repository layer: one zero-sized struct per table, taking `&PgPool`.

pub mod slide_repo;

pub use slide_repo::SlideRepo;
