//! Page models.

pub mod page;

pub use page::{CreatePage, Page, PageStore, UpdatePage, VisibilityLimit, slugify};
