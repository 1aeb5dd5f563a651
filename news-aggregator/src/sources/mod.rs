pub mod html_site;
pub mod news_sites;

pub use html_site::{FieldRule, HtmlSiteExtractor, SiteLayout};

use crate::types::{AggregatorError, Extractor, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Which extractor a configured source is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Liputan6,
    Bisnis,
    AbcIndonesian,
}

/// Exact endpoint URLs accepted for each kind. No prefix or fuzzy matching.
const ROUTES: [(&str, ExtractorKind); 3] = [
    ("https://www.liputan6.com/", ExtractorKind::Liputan6),
    ("https://www.bisnis.com/", ExtractorKind::Bisnis),
    ("https://www.abc.net.au/news/indonesian", ExtractorKind::AbcIndonesian),
];

impl ExtractorKind {
    pub fn from_url(url: &str) -> Result<Self> {
        ROUTES
            .iter()
            .find(|(route, _)| *route == url)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| AggregatorError::UnsupportedSource {
                url: url.to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::Liputan6 => "liputan6",
            ExtractorKind::Bisnis => "bisnis",
            ExtractorKind::AbcIndonesian => "abc_indonesian",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding of each source kind to the extractor that handles it.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    bindings: HashMap<ExtractorKind, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in site extractors.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            ExtractorKind::Liputan6,
            Arc::new(HtmlSiteExtractor::new(news_sites::LIPUTAN6)?),
        );
        registry.register(
            ExtractorKind::Bisnis,
            Arc::new(HtmlSiteExtractor::new(news_sites::BISNIS)?),
        );
        registry.register(
            ExtractorKind::AbcIndonesian,
            Arc::new(HtmlSiteExtractor::new(news_sites::ABC_INDONESIAN)?),
        );
        Ok(registry)
    }

    /// Binds `kind` to `extractor`, replacing any previous binding.
    pub fn register(&mut self, kind: ExtractorKind, extractor: Arc<dyn Extractor>) {
        self.bindings.insert(kind, extractor);
    }

    pub fn get(&self, kind: ExtractorKind) -> Option<Arc<dyn Extractor>> {
        self.bindings.get(&kind).cloned()
    }
}
