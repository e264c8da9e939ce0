//! Slug derivation for slide names.
//!
//! A slug names both the project directory and the published output
//! directory, so it must be non-empty and consist only of `[a-z0-9-]`.

use crate::error::CoreError;

/// Sentinel stored in `project_path` until the create job has scaffolded
/// the real directory.
pub const PENDING_PROJECT_PATH: &str = "pending";

/// Normalize `name` into a slug: ASCII-transliterated, lower-case, with
/// every run of non-alphanumeric characters collapsed into a single `-`.
///
/// ```
/// use deckhand_core::slug::generate_slug;
///
/// assert_eq!(generate_slug("Rust Meetup #3"), "rust-meetup-3");
/// assert_eq!(generate_slug("  Déjà  Vu!  "), "deja-vu");
/// ```
pub fn generate_slug(name: &str) -> String {
    slug::slugify(name)
}

/// Validate a user-supplied name and derive its slug.
///
/// Rejects blank names and names that normalize to an empty slug (for
/// example a name made only of punctuation).
pub fn derive_slug(name: &str) -> Result<String, CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be blank".to_string()));
    }

    let slug = generate_slug(name);
    if !is_valid_slug(&slug) {
        return Err(CoreError::Validation(format!(
            "Name {name:?} does not produce a usable slug"
        )));
    }
    Ok(slug)
}

/// `true` if `slug` is non-empty kebab-case (`[a-z0-9]` segments joined by `-`).
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
