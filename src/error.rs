//! Error taxonomy.
//!
//! Construction-time invariant violations are returned as [`Error`].
//! Steady-state update paths never fail: they log a warning through
//! `tracing` and keep the last valid state.

use thiserror::Error;

/// Errors surfaced by the composition root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Fewer than two themes were configured; the dark/light pair is required.
    #[error("at least two themes are required (dark and light), got {0}")]
    NotEnoughThemes(usize),

    /// A language outside the configured allow-list was requested.
    #[error("language `{0}` is not registered")]
    UnknownLanguage(String),

    /// A theme outside the configured set was requested and could not be
    /// registered.
    #[error("theme `{0}` is not registered")]
    UnknownTheme(String),

    /// Highlighter construction failed.
    #[error(transparent)]
    Highlighter(#[from] HighlightError),

    /// The operation needs an editor that has not been created.
    #[error("no editor has been created")]
    NoEditor,
}

/// Failure to construct a highlighter.
///
/// Clonable so a single failed construction can be observed by every
/// waiter of the shared cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("highlighter construction failed: {message}")]
pub struct HighlightError {
    message: String,
}

impl HighlightError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result alias for fallible composition-root operations.
pub type Result<T> = std::result::Result<T, Error>;
