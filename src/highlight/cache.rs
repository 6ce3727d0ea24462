//! Highlighter cache: One shared construction per theme set.
//!
//! Entries are keyed by the canonical (sorted, deduplicated) theme set and
//! remember which languages they cover. A request for languages an entry
//! does not cover replaces it with a construction over the union; if that
//! construction fails the previous entry is put back. Entries are never
//! evicted automatically.

use super::{HighlightError, HighlighterFactory};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

/// A cloneable, possibly still pending highlighter construction.
pub type SharedHighlighter<H> = Shared<LocalBoxFuture<'static, Result<Rc<H>, HighlightError>>>;

/// Canonical, order-independent key of a theme set.
pub fn theme_key(themes: &[String]) -> String {
    let set: BTreeSet<&str> = themes.iter().map(String::as_str).collect();
    set.into_iter().collect::<Vec<_>>().join("|")
}

struct Entry<H> {
    id: u64,
    highlighter: SharedHighlighter<H>,
    languages: BTreeSet<String>,
}

impl<H> Clone for Entry<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            highlighter: self.highlighter.clone(),
            languages: self.languages.clone(),
        }
    }
}

struct CacheState<H> {
    entries: HashMap<String, Entry<H>>,
    next_id: u64,
}

impl<H> CacheState<H> {
    /// Undo entry `id` under `key`, restoring `previous` if there was one.
    fn rollback(&mut self, key: &str, id: u64, previous: Option<Entry<H>>) {
        if self.entries.get(key).is_none_or(|entry| entry.id != id) {
            // Superseded since; leave the newer entry alone.
            return;
        }
        match previous {
            Some(entry) => {
                self.entries.insert(key.to_owned(), entry);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }
}

/// Memoizes highlighter construction by theme set and language coverage.
pub struct HighlighterCache<F: HighlighterFactory> {
    factory: F,
    state: Rc<RefCell<CacheState<F::Highlighter>>>,
}

impl<F: HighlighterFactory> fmt::Debug for HighlighterCache<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HighlighterCache")
            .field("keys", &state.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<F: HighlighterFactory> HighlighterCache<F> {
    /// Create an empty cache over `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            state: Rc::new(RefCell::new(CacheState {
                entries: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// The underlying factory.
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Number of cached theme sets.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Drop every cached entry. Pending constructions keep running for
    /// whoever already holds them.
    pub fn clear(&self) {
        self.state.borrow_mut().entries.clear();
        tracing::debug!(target: "stream_editor::highlight", "highlighter_cache_cleared");
    }

    /// Languages covered for a theme set, if cached.
    pub fn covered_languages(&self, themes: &[String]) -> Option<Vec<String>> {
        self.state
            .borrow()
            .entries
            .get(&theme_key(themes))
            .map(|entry| entry.languages.iter().cloned().collect())
    }

    /// Get a highlighter covering `themes` and `languages`.
    ///
    /// Returns the cached construction when it already covers every
    /// requested language; otherwise starts a construction over the union
    /// of covered and requested languages.
    pub fn get_or_create(&self, themes: &[String], languages: &[String]) -> SharedHighlighter<F::Highlighter> {
        let key = theme_key(themes);
        let requested: BTreeSet<String> = languages.iter().cloned().collect();

        let mut state = self.state.borrow_mut();
        let previous = state.entries.get(&key).cloned();
        if let Some(entry) = &previous {
            if entry.languages.is_superset(&requested) {
                tracing::trace!(target: "stream_editor::highlight", key = %key, "highlighter_cache_hit");
                return entry.highlighter.clone();
            }
        }

        let mut union = previous
            .as_ref()
            .map(|entry| entry.languages.clone())
            .unwrap_or_default();
        union.extend(requested);
        let union_list: Vec<String> = union.iter().cloned().collect();

        let id = state.next_id;
        state.next_id += 1;

        tracing::debug!(
            target: "stream_editor::highlight",
            key = %key,
            languages = ?union_list,
            widened = previous.is_some(),
            "highlighter_construct"
        );

        let construction = self.factory.create(themes, &union_list);
        let weak: Weak<RefCell<CacheState<F::Highlighter>>> = Rc::downgrade(&self.state);
        let entry_key = key.clone();
        let highlighter = async move {
            let result = construction.await.map(Rc::new);
            if let Err(err) = &result {
                tracing::warn!(
                    target: "stream_editor::highlight",
                    key = %entry_key,
                    error = %err,
                    restored = previous.is_some(),
                    "highlighter_construct_failed"
                );
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().rollback(&entry_key, id, previous);
                }
            }
            result
        }
        .boxed_local()
        .shared();

        state.entries.insert(
            key,
            Entry {
                id,
                highlighter: highlighter.clone(),
                languages: union,
            },
        );
        highlighter
    }
}
