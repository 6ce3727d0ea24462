//! Themes: Dark/light preference and the active theme.
//!
//! The first two configured themes form the dark/light pair. Until a theme
//! is chosen explicitly, the active theme tracks the host's dark-mode
//! preference, delivered through a [`PreferenceSource`] subscription.

use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

const TARGET: &str = "stream_editor::theme";

/// A host-provided dark/light preference.
pub trait PreferenceSource {
    /// Current preference.
    fn is_dark(&self) -> bool;

    /// Subscribe to preference changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> Receiver<bool>;
}

#[derive(Debug, Default)]
struct SignalState {
    dark: bool,
    subscribers: Vec<Sender<bool>>,
}

/// A shared, settable dark-mode flag.
///
/// Clones share the same flag; every change is broadcast to subscribers.
#[derive(Debug, Clone, Default)]
pub struct DarkModeSignal {
    state: Arc<Mutex<SignalState>>,
}

impl DarkModeSignal {
    /// Create a signal with the given initial value.
    pub fn new(dark: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SignalState {
                dark,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Change the preference. Subscribers are notified only on change.
    pub fn set_dark(&self, dark: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.dark == dark {
            return;
        }
        state.dark = dark;
        state.subscribers.retain(|tx| tx.send(dark).is_ok());
    }

    /// Number of live subscriptions (as of the last broadcast).
    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}

impl PreferenceSource for DarkModeSignal {
    fn is_dark(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).dark
    }

    fn subscribe(&self) -> Receiver<bool> {
        let (tx, rx) = unbounded();
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .push(tx);
        rx
    }
}

/// Configured themes and the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSet {
    themes: Vec<String>,
    current: String,
    /// Set once a theme was chosen explicitly; preference changes are then ignored.
    explicit: bool,
}

impl ThemeSet {
    /// Build the set and pick the initial theme.
    ///
    /// `initial` wins if given; otherwise the preference picks from the
    /// dark/light pair.
    pub fn new(themes: Vec<String>, initial: Option<&str>, dark: bool) -> Result<Self> {
        if themes.len() < 2 {
            return Err(Error::NotEnoughThemes(themes.len()));
        }
        let (current, explicit) = match initial {
            Some(theme) => (theme.to_owned(), true),
            None => (Self::pair(&themes, dark).to_owned(), false),
        };
        let mut set = Self {
            themes,
            current: String::new(),
            explicit,
        };
        set.include(&current);
        set.current = current;
        Ok(set)
    }

    fn pair(themes: &[String], dark: bool) -> &str {
        if dark {
            &themes[0]
        } else {
            &themes[1]
        }
    }

    /// All known themes.
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// The active theme.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Check if a theme was chosen explicitly.
    pub const fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Check if `theme` is known.
    pub fn contains(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }

    /// Add `theme` to the known set. Returns `true` if it was new.
    pub fn include(&mut self, theme: &str) -> bool {
        if self.contains(theme) {
            return false;
        }
        self.themes.push(theme.to_owned());
        true
    }

    /// Make `theme` active and stop following the preference.
    pub fn select(&mut self, theme: &str) {
        theme.clone_into(&mut self.current);
        self.explicit = true;
    }

    /// React to a preference change.
    ///
    /// Returns the theme to activate, or `None` if nothing changes.
    pub fn on_preference(&mut self, dark: bool) -> Option<&str> {
        if self.explicit {
            debug!(target: TARGET, dark, "preference_ignored_explicit_theme");
            return None;
        }
        let next = Self::pair(&self.themes, dark);
        if next == self.current {
            return None;
        }
        self.current = next.to_owned();
        debug!(target: TARGET, dark, theme = %self.current, "preference_theme_switch");
        Some(&self.current)
    }
}
