//! Row structs and DTOs.

pub mod slide;
