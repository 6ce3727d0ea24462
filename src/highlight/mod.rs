//! Highlighting: Memoized highlighter construction and registration.
//!
//! Building a highlighter for a set of themes and languages is the most
//! expensive step of bringing up an editor. The [`HighlighterCache`] keeps
//! one shared construction future per theme set and widens it when new
//! languages are requested. The [`HighlighterRegistry`] sits on top: it is
//! owned by the composition root, skips redundant registrations and binds
//! resolved highlighters into the surface.

mod cache;
mod registry;

pub use crate::error::HighlightError;
pub use cache::{theme_key, HighlighterCache, SharedHighlighter};
pub use registry::HighlighterRegistry;

use futures::future::LocalBoxFuture;

/// Constructs highlighters for a theme set and a language set.
pub trait HighlighterFactory {
    /// Highlighter type produced.
    type Highlighter: 'static;

    /// Start constructing a highlighter. May be slow.
    fn create(
        &self,
        themes: &[String],
        languages: &[String],
    ) -> LocalBoxFuture<'static, Result<Self::Highlighter, HighlightError>>;
}
