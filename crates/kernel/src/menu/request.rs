//! Per-render request context handed to providers and modifiers.

use crate::models::PageStore;

/// Who is looking at the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visitor {
    #[default]
    Anonymous,
    Authenticated,
}

impl Visitor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Inputs of one navigation render.
#[derive(Debug, Clone)]
pub struct MenuRequest<'a> {
    /// Current page state.
    pub pages: &'a PageStore,
    /// Request path, used to find the selected node.
    pub path: String,
    pub visitor: Visitor,
    /// Language code; static menu entries tagged with another language are
    /// left out.
    pub language: String,
}

impl<'a> MenuRequest<'a> {
    /// Anonymous request for `path` in the default language.
    pub fn new(pages: &'a PageStore, path: impl Into<String>) -> Self {
        Self {
            pages,
            path: path.into(),
            visitor: Visitor::Anonymous,
            language: "en".to_string(),
        }
    }

    pub fn with_visitor(mut self, visitor: Visitor) -> Self {
        self.visitor = visitor;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
