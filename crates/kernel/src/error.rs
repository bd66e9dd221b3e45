//! Kernel error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the page store, the menu pool, and fixture loading.
///
/// Navigation composition itself never fails: unknown extenders and
/// dangling provider parents degrade to the default tree.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("page not found: {0}")]
    PageNotFound(Uuid),

    #[error("invalid slug for page {title:?}")]
    InvalidSlug { title: String },

    #[error("page {page} cannot be moved below its own descendant {parent}")]
    CyclicParent { page: Uuid, parent: Uuid },

    #[error("menu already registered: {0}")]
    DuplicateMenu(String),

    #[error("invalid site fixture: {0}")]
    Fixture(String),
}

/// Result type alias using NavError.
pub type NavResult<T> = Result<T, NavError>;
