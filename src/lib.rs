//! # Flywheel Stream Editor
//!
//! Incremental text synchronization for code editors fed by streamed model
//! output.
//!
//! Streamed content arrives as full snapshots or append fragments, often
//! many times per frame. This crate applies it to a persistent editor buffer
//! with as little disruption as possible and decides when the view should
//! follow the new content.
//!
//! ## Core Concepts
//!
//! - **Frame coalescing**: Updates are stored and flushed once per frame, last write wins
//! - **Optimistic append**: Pure suffix updates skip diffing entirely
//! - **Minimal edit**: Everything else becomes one common-prefix/suffix trimmed replacement
//! - **Viewport following**: Auto-scroll pauses when the user scrolls up and resumes at the bottom
//! - **Highlighter cache**: One shared highlighter construction per theme set
//!
//! ## Example
//!
//! ```rust,ignore
//! use stream_editor::{DarkModeSignal, EditorOptions, StreamEditor};
//! use stream_editor::surface::memory::{MemoryHighlighterFactory, MemorySurface};
//!
//! let signal = DarkModeSignal::new(true);
//! let mut editor = StreamEditor::new(
//!     MemorySurface::new(),
//!     MemoryHighlighterFactory::new(),
//!     EditorOptions::default(),
//!     &signal,
//! )?;
//! futures::executor::block_on(editor.create_editor("main".into(), "", "rust"))?;
//!
//! editor.update_code("fn main() {\n", Some("rust"));
//! editor.on_frame(std::time::Instant::now());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod edit;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod manager;
pub mod schedule;
pub mod surface;
pub mod theme;
pub mod viewport;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::EditorOptions;
pub use edit::{compute_minimal_edit, AppendBuffer, MinimalEdit};
pub use editor::StreamEditor;
pub use error::{Error, HighlightError, Result};
pub use highlight::{HighlighterCache, HighlighterFactory, HighlighterRegistry};
pub use manager::{DiffEditorManager, EditorManager, FrameKind, PendingDiff, PendingUpdate, UpdateEffects};
pub use schedule::{FrameClock, FrameScheduler, Tick};
pub use surface::{
    DiffSide, DiffView, EditorSurface, EditorView, Position, RevealStrategy, ScrollMetrics,
    SurfaceEvent, TextEdit, TextModel, TextRange, ViewOptions,
};
pub use theme::{DarkModeSignal, PreferenceSource, ThemeSet};
pub use viewport::{FollowOptions, FollowState, ViewportFollower};
