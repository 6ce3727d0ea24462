//! Highlighter registry: Idempotent registration with the surface.

use super::cache::theme_key;
use super::{HighlightError, HighlighterCache, HighlighterFactory};
use crate::surface::EditorSurface;
use std::collections::BTreeSet;

/// Signature of the last successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    themes: String,
    languages: BTreeSet<String>,
}

impl Registration {
    fn new(themes: &[String], languages: &[String]) -> Self {
        Self {
            themes: theme_key(themes),
            languages: languages.iter().cloned().collect(),
        }
    }
}

/// Registers themes and languages with a surface, once per signature.
///
/// Owned by the composition root. The language set only grows.
#[derive(Debug)]
pub struct HighlighterRegistry<F: HighlighterFactory> {
    cache: HighlighterCache<F>,
    registered: Option<Registration>,
    languages: BTreeSet<String>,
}

impl<F: HighlighterFactory> HighlighterRegistry<F> {
    /// Create a registry constructing highlighters with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            cache: HighlighterCache::new(factory),
            registered: None,
            languages: BTreeSet::new(),
        }
    }

    /// The underlying cache.
    pub const fn cache(&self) -> &HighlighterCache<F> {
        &self.cache
    }

    /// Languages registered with the surface so far.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Check if `(themes, languages)` is the current registration.
    pub fn is_registered(&self, themes: &[String], languages: &[String]) -> bool {
        self.registered.as_ref() == Some(&Registration::new(themes, languages))
    }

    /// Make `themes` and `languages` available on `surface`.
    ///
    /// Returns `Ok(false)` without touching the cache when the pair is
    /// already registered. Otherwise new languages are registered, the
    /// highlighter is awaited from the cache and bound into the surface.
    pub async fn register<S>(
        &mut self,
        surface: &mut S,
        themes: &[String],
        languages: &[String],
    ) -> Result<bool, HighlightError>
    where
        S: EditorSurface<Highlighter = F::Highlighter>,
    {
        let registration = Registration::new(themes, languages);
        if self.registered.as_ref() == Some(&registration) {
            tracing::trace!(target: "stream_editor::highlight", "registration_skipped");
            return Ok(false);
        }

        for language in languages {
            if self.languages.insert(language.clone()) {
                surface.register_language(language);
            }
        }

        let highlighter = self.cache.get_or_create(themes, languages).await?;
        surface.bind_highlighter(&highlighter, themes, languages);
        self.registered = Some(registration);

        tracing::debug!(
            target: "stream_editor::highlight",
            themes = ?themes,
            languages = ?languages,
            "highlighter_registered"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::{MemoryHighlighterFactory, MemorySurface};
    use futures::executor::block_on;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_redundant_registration_is_skipped() {
        let mut surface = MemorySurface::new();
        let mut registry = HighlighterRegistry::new(MemoryHighlighterFactory::new());
        let themes = strings(&["dark", "light"]);
        let langs = strings(&["rust", "python"]);

        assert_eq!(block_on(registry.register(&mut surface, &themes, &langs)), Ok(true));
        assert_eq!(block_on(registry.register(&mut surface, &themes, &langs)), Ok(false));

        assert_eq!(registry.cache().factory().created(), 1);
        assert_eq!(surface.bindings().len(), 1);
        assert_eq!(surface.languages(), &langs[..]);
        assert!(registry.is_registered(&strings(&["light", "dark"]), &strings(&["python", "rust"])));
    }

    #[test]
    fn test_languages_only_grow() {
        let mut surface = MemorySurface::new();
        let mut registry = HighlighterRegistry::new(MemoryHighlighterFactory::new());
        let themes = strings(&["dark", "light"]);

        block_on(registry.register(&mut surface, &themes, &strings(&["rust"]))).unwrap();
        block_on(registry.register(&mut surface, &themes, &strings(&["python"]))).unwrap();

        assert_eq!(registry.languages().collect::<Vec<_>>(), vec!["python", "rust"]);
        assert_eq!(surface.languages(), &strings(&["rust", "python"])[..]);
        assert_eq!(surface.bindings().len(), 2);
    }

    #[test]
    fn test_failed_registration_can_be_retried() {
        let mut surface = MemorySurface::new();
        let mut registry = HighlighterRegistry::new(MemoryHighlighterFactory::new());
        let themes = strings(&["dark", "light"]);
        let langs = strings(&["rust"]);

        registry.cache().factory().fail_next();
        assert!(block_on(registry.register(&mut surface, &themes, &langs)).is_err());
        assert!(!registry.is_registered(&themes, &langs));
        assert!(surface.bindings().is_empty());

        assert_eq!(block_on(registry.register(&mut surface, &themes, &langs)), Ok(true));
    }
}
